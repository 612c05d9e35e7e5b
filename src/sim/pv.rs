use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::cancel::CancelToken;
use super::config::PvConfig;
use super::result::{FaceResult, PvAggregates, PvEstimate};
use super::shading::{classify_face_with_tolerance, estimate_shadow_fraction};
use crate::TriangleIndex;
use crate::error::{EstimateError, EstimateResult};
use crate::geom::mesh::Mesh;
use crate::scene::OcclusionTester;
use crate::sun::DirectionalLight;

/// Golden-ratio increment used to spread per-face seeds.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Estimates per-face shadow fractions and PV values of a building mesh.
///
/// Every triangle is classified as rooftop or vertical, sampled with
/// `config.sample_count` jittered shadow rays toward the light, and assigned
/// `ghi * area * (1 - shadow) * efficiency`. When the light is off (sun below
/// the horizon) no rays are cast: every face is fully shadowed and all PV
/// values are 0.
///
/// With `config.seed` set the result does not depend on thread scheduling.
/// The estimate stops with `Cancelled` once `cancel` is triggered.
pub fn calculate_building_pv<T>(
    mesh: &Mesh,
    light: &DirectionalLight,
    tester: &T,
    config: &PvConfig,
    cancel: Option<&CancelToken>,
) -> EstimateResult<PvEstimate>
where
    T: OcclusionTester + ?Sized,
{
    config.validate()?;
    let faces = mesh.faces().ok_or_else(|| {
        EstimateError::UnsupportedGeometry("mesh has no triangle index".to_string())
    })?;
    let lit = light.is_lit();
    debug!(
        "Estimating PV for {} faces (lit={}, samples={}, parallel={})",
        faces.len(),
        lit,
        config.sample_count,
        config.parallel
    );

    let estimate_face = |(idx, face): (usize, &TriangleIndex)| -> EstimateResult<FaceResult> {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(EstimateError::Cancelled);
        }
        face_result(idx, face, mesh, light, tester, config, lit)
    };

    let results: Vec<FaceResult> = if config.parallel {
        faces
            .par_iter()
            .enumerate()
            .map(estimate_face)
            .collect::<EstimateResult<_>>()?
    } else {
        faces
            .iter()
            .enumerate()
            .map(estimate_face)
            .collect::<EstimateResult<_>>()?
    };

    let aggregates = PvAggregates::from_faces(&results, config, lit);
    if aggregates.degenerate_faces > 0 {
        debug!("Skipped {} degenerate faces", aggregates.degenerate_faces);
    }
    info!(
        "PV estimate: area={:.2} shadow={:.3} pv={:.3} rooftop_pv={:.3}",
        aggregates.total_area,
        aggregates.total_shadow_fraction,
        aggregates.total_pv_value,
        aggregates.rooftop_pv_value
    );

    Ok(PvEstimate {
        faces: results,
        aggregates,
    })
}

fn face_result<T>(
    idx: usize,
    face: &TriangleIndex,
    mesh: &Mesh,
    light: &DirectionalLight,
    tester: &T,
    config: &PvConfig,
    lit: bool,
) -> EstimateResult<FaceResult>
where
    T: OcclusionTester + ?Sized,
{
    let Some(geom) = mesh.face_geometry(face) else {
        return Ok(FaceResult::degenerate(idx));
    };
    let orientation = classify_face_with_tolerance(&geom.normal, config.vertical_tolerance_deg);

    let shadow_fraction = if lit {
        let mut rng = face_rng(config.seed, idx);
        let origin = geom.centroid + geom.normal * config.origin_offset;
        estimate_shadow_fraction(
            origin,
            light.position,
            tester,
            config.sample_count,
            config.jitter,
            &mut rng,
        )?
    } else {
        1.0
    };
    let pv_value = if lit {
        config.ghi * geom.area * (1.0 - shadow_fraction) * config.efficiency
    } else {
        0.0
    };

    Ok(FaceResult {
        index: idx,
        area: geom.area,
        centroid: geom.centroid,
        normal: geom.normal,
        orientation,
        shadow_fraction,
        pv_value,
        degenerate: false,
    })
}

fn face_rng(seed: Option<u64>, idx: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ (idx as u64).wrapping_mul(SEED_MIX)),
        None => StdRng::from_entropy(),
    }
}
