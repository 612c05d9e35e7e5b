//! Loading and exporting scenes.

pub mod bim;
pub mod stl;

pub use bim::{load_scene, read_bim, scene_to_bim, write_bim};
pub use stl::{StlFormat, read_stl, read_stl_scene};
