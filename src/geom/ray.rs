//! Ray casting infrastructure.
//!
//! This module provides a Ray struct and ray-triangle intersection tests
//! used for shadow sampling.

use crate::geom::mesh::Mesh;
use crate::{Point, Vector};

/// Minimum ray parameter accepted as a hit.
///
/// Hits closer than this to the ray origin are ignored to avoid self-intersection.
pub const MIN_HIT_DISTANCE: f64 = 1e-9;

/// Determinant threshold below which the ray is treated as parallel to a triangle.
const PARALLEL_EPS: f64 = 1e-12;

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Direction vector (unit length)
    pub direction: Vector,
}

impl Ray {
    /// Creates a new ray from origin point and direction vector.
    ///
    /// The direction vector is automatically normalized.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let normalized = direction.normalize().ok()?;
        Some(Self {
            origin,
            direction: normalized,
        })
    }

    /// Möller-Trumbore intersection with the triangle `(p0, p1, p2)`.
    ///
    /// Both triangle sides are hit. Returns the distance `t` along the ray
    /// if the hit lies in front of the origin (`t > MIN_HIT_DISTANCE`).
    pub fn intersect_triangle(&self, p0: Point, p1: Point, p2: Point) -> Option<f64> {
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let pvec = self.direction.cross(&edge2);
        let det = edge1.dot(&pvec);
        if det.abs() < PARALLEL_EPS {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = self.origin - p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let v = self.direction.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        if t > MIN_HIT_DISTANCE { Some(t) } else { None }
    }

    /// Returns the closest hit with any triangle of the mesh as `(t, face_index)`.
    ///
    /// Meshes without a triangle index are never hit.
    pub fn intersect_mesh(&self, mesh: &Mesh) -> Option<(f64, usize)> {
        let faces = mesh.faces()?;
        let mut closest: Option<(f64, usize)> = None;

        for (idx, (p0, p1, p2)) in faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| mesh.triangle_points(f).map(|pts| (i, pts)))
        {
            if let Some(t) = self.intersect_triangle(p0, p1, p2) {
                match closest {
                    None => closest = Some((t, idx)),
                    Some((best_t, _)) if t < best_t => closest = Some((t, idx)),
                    _ => {}
                }
            }
        }

        closest
    }

    /// Returns true if the ray hits any triangle of the mesh.
    pub fn hits_mesh(&self, mesh: &Mesh) -> bool {
        let Some(faces) = mesh.faces() else {
            return false;
        };
        faces.iter().any(|f| {
            mesh.triangle_points(f)
                .and_then(|(p0, p1, p2)| self.intersect_triangle(p0, p1, p2))
                .is_some()
        })
    }
}
