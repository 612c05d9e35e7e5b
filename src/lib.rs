//! Sun position and photovoltaic potential estimation for triangulated
//! building models.
//!
//! The [`sun`] module computes the astronomical sun position and the light it
//! casts on a Y-up scene. The [`sim`] module estimates per-face shadow
//! fractions with jittered shadow rays and derives simplified PV values.
//! [`Session`] ties both to a loaded [`scene::Scene`] and a building selection.

pub mod error;
pub mod geom;
pub mod io;
pub mod scene;
pub mod session;
pub mod sim;
pub mod sun;

// Prelude
pub use error::{EstimateError, EstimateResult};
pub use geom::mesh::Mesh;
pub use geom::point::Point;
pub use geom::ray::Ray;
pub use geom::triangles::TriangleIndex;
pub use geom::vector::Vector;
pub use scene::{Building, OcclusionTester, Scene, SceneObject};
pub use session::{Session, SessionConfig};
pub use sim::{BuildingReport, PvConfig, PvEstimate, calculate_building_pv};
pub use sun::{Location, SunPosition};
