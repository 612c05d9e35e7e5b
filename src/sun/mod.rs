//! Sun Position Estimator.
//!
//! Astronomical sun azimuth/altitude, sunrise/sunset and the directional
//! light derived from them. Angles are in radians; the scene is Y-up.

pub mod ephemeris;
pub mod light;
pub mod location;
pub mod position;
pub mod times;

pub use light::{DirectionalLight, LightConfig, SunLight, compute_light_vector};
pub use location::{Location, local_datetime};
pub use position::SunPosition;
pub use times::{SunTimes, daylight_hours, sun_times};
