//! Scene geometry, occlusion testing and building selection.

pub mod building;
pub mod occlusion;
pub mod selection;

use std::collections::HashSet;

use tracing::warn;

use crate::Point;
use crate::geom::bboxes::ray_hits_bbox;
use crate::geom::mesh::Mesh;
use crate::geom::ray::Ray;

pub use building::{Building, DEFAULT_BUILDING_COLOR, Material};
pub use occlusion::{Hit, OcclusionTester};
pub use selection::Selection;

/// Tag of the sky dome, excluded from occlusion tests by default.
pub const SKY_TAG: &str = "sky";
/// Tag of selectable buildings.
pub const BUILDING_TAG: &str = "building";

/// A named piece of scene geometry.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub tag: String,
    pub mesh: Mesh,
    bbox: Option<(Point, Point)>,
}

impl SceneObject {
    pub fn new(name: &str, tag: &str, mesh: Mesh) -> Self {
        let bbox = mesh.bbox();
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            mesh,
            bbox,
        }
    }

    pub fn bbox(&self) -> Option<(Point, Point)> {
        self.bbox
    }

    pub fn is_building(&self) -> bool {
        self.tag == BUILDING_TAG
    }

    /// Cheap rejection before testing triangles.
    fn may_be_hit(&self, ray: &Ray) -> bool {
        match self.bbox {
            Some((pmin, pmax)) => ray_hits_bbox(ray, pmin, pmax),
            None => false,
        }
    }
}

/// Flat collection of scene objects acting as the occluder set.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    excluded_tags: HashSet<String>,
}

impl Scene {
    /// Creates a scene; objects tagged `"sky"` are excluded from ray tests.
    pub fn new(objects: Vec<SceneObject>) -> Self {
        for obj in objects.iter().filter(|o| o.mesh.faces().is_none()) {
            warn!("Scene object '{}' has no triangle index and cannot occlude", obj.name);
        }
        Self {
            objects,
            excluded_tags: HashSet::from([SKY_TAG.to_string()]),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, idx: usize) -> Option<&SceneObject> {
        self.objects.get(idx)
    }

    pub fn find(&self, name: &str) -> Option<(usize, &SceneObject)> {
        self.objects.iter().enumerate().find(|(_, o)| o.name == name)
    }

    pub fn push(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn excluded_tags(&self) -> &HashSet<String> {
        &self.excluded_tags
    }

    fn is_excluded(&self, object: &SceneObject) -> bool {
        self.excluded_tags.contains(&object.tag)
    }

    fn candidates<'a>(&'a self, ray: &'a Ray) -> impl Iterator<Item = &'a SceneObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| !self.is_excluded(o))
            .filter(move |o| o.may_be_hit(ray))
    }
}

impl OcclusionTester for Scene {
    fn cast_ray(&self, ray: &Ray) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self
            .candidates(ray)
            .filter_map(|o| {
                ray.intersect_mesh(&o.mesh).map(|(distance, face)| Hit {
                    object: o.name.clone(),
                    face,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn is_occluded(&self, ray: &Ray) -> bool {
        self.candidates(ray).any(|o| ray.hits_mesh(&o.mesh))
    }

    fn exclude_by_tag(&mut self, tag: &str) {
        self.excluded_tags.insert(tag.to_string());
    }

    fn include_tag(&mut self, tag: &str) {
        self.excluded_tags.remove(tag);
    }
}
