//! Shadow & PV Estimator.

pub mod cancel;
pub mod color;
pub mod config;
pub mod pv;
pub mod result;
pub mod shading;

pub use cancel::CancelToken;
pub use config::PvConfig;
pub use pv::calculate_building_pv;
pub use result::{BuildingReport, FaceResult, PvAggregates, PvEstimate};
pub use shading::{Orientation, classify_face, estimate_shadow_fraction};
