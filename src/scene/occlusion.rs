use serde::Serialize;

use crate::geom::ray::Ray;

/// A ray hit on a named scene object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub object: String,
    /// Index of the hit triangle within the object's mesh.
    pub face: usize,
    pub distance: f64,
}

/// Minimal ray-casting interface the shading estimator needs from a scene.
///
/// Implementations must be shareable across worker threads.
pub trait OcclusionTester: Sync {
    /// All hits along the ray, sorted by distance, excluding excluded tags.
    fn cast_ray(&self, ray: &Ray) -> Vec<Hit>;

    /// Returns true if anything blocks the ray.
    fn is_occluded(&self, ray: &Ray) -> bool {
        !self.cast_ray(ray).is_empty()
    }

    /// Excludes objects carrying `tag` from all subsequent ray tests.
    fn exclude_by_tag(&mut self, tag: &str);

    /// Re-includes objects carrying `tag`.
    fn include_tag(&mut self, tag: &str);
}
