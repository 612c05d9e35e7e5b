//! Face classification and Monte-Carlo soft shadow sampling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, EstimateResult};
use crate::geom::UP;
use crate::geom::ray::Ray;
use crate::scene::OcclusionTester;
use crate::{Point, Vector};

/// Default tolerance (degrees) around 90° for vertical faces.
pub const VERTICAL_TOLERANCE_DEG: f64 = 1.0;

/// Binary split of faces by normal orientation.
///
/// Slanted roofs within the tolerance of vertical are counted as vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Rooftop,
    Vertical,
}

/// Classifies a face by the angle between its outward normal and the up vector.
pub fn classify_face(normal: &Vector) -> Orientation {
    classify_face_with_tolerance(normal, VERTICAL_TOLERANCE_DEG)
}

/// Like [`classify_face`] with a custom tolerance in degrees.
///
/// A zero-length normal is classified as `Rooftop`.
pub fn classify_face_with_tolerance(normal: &Vector, tolerance_deg: f64) -> Orientation {
    match normal.angle(&UP) {
        Ok(angle) if (angle.to_degrees() - 90.0).abs() <= tolerance_deg => Orientation::Vertical,
        _ => Orientation::Rooftop,
    }
}

/// Estimates the fraction of jittered rays from `point` toward `light_position`
/// that are blocked by the scene.
///
/// Each sample perturbs the direction by a uniform offset in `[-jitter, jitter]`
/// per axis, approximating an area light. The result is stochastic unless
/// `rng` is seeded and always lies in `[0, 1]`.
pub fn estimate_shadow_fraction<T, R>(
    point: Point,
    light_position: Point,
    tester: &T,
    sample_count: usize,
    jitter: f64,
    rng: &mut R,
) -> EstimateResult<f64>
where
    T: OcclusionTester + ?Sized,
    R: Rng + ?Sized,
{
    if sample_count == 0 {
        return Err(EstimateError::InvalidInput(
            "sample count must be at least 1".to_string(),
        ));
    }
    let direction = (light_position - point).normalize().map_err(|_| {
        EstimateError::InvalidInput(format!("point {point} coincides with the light"))
    })?;
    let jitter = jitter.abs();

    let mut hits = 0;
    for _ in 0..sample_count {
        let offset = if jitter > 0.0 {
            Vector::new(
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
            )
        } else {
            Vector::new(0.0, 0.0, 0.0)
        };
        // A jitter cancelling the direction yields no ray; count it as unblocked
        if let Some(ray) = Ray::new(point, direction + offset) {
            if tester.is_occluded(&ray) {
                hits += 1;
            }
        }
    }

    Ok(hits as f64 / sample_count as f64)
}
