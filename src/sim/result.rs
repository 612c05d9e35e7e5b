use serde::Serialize;

use super::config::PvConfig;
use super::shading::Orientation;
use crate::{Point, Vector};

/// Per-face output of the PV estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceResult {
    /// Index of the triangle in the mesh.
    pub index: usize,
    pub area: f64,
    pub centroid: Point,
    pub normal: Vector,
    pub orientation: Orientation,
    pub shadow_fraction: f64,
    pub pv_value: f64,
    /// Zero-area or otherwise unusable triangle; contributes nothing.
    pub degenerate: bool,
}

impl FaceResult {
    pub(crate) fn degenerate(index: usize) -> Self {
        Self {
            index,
            area: 0.0,
            centroid: Point::origin(),
            normal: Vector::new(0.0, 0.0, 0.0),
            orientation: Orientation::Rooftop,
            shadow_fraction: 0.0,
            pv_value: 0.0,
            degenerate: true,
        }
    }
}

/// Area-weighted building totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PvAggregates {
    pub total_area: f64,
    pub rooftop_area: f64,
    pub vertical_area: f64,
    pub rooftop_shadow_fraction: f64,
    pub vertical_shadow_fraction: f64,
    pub total_shadow_fraction: f64,
    pub total_pv_value: f64,
    pub rooftop_pv_value: f64,
    pub degenerate_faces: usize,
}

impl PvAggregates {
    /// Aggregates per-face results.
    ///
    /// `lit` is false when the sun is below the horizon; all PV values are then 0.
    pub fn from_faces(faces: &[FaceResult], config: &PvConfig, lit: bool) -> Self {
        let mut agg = Self::default();
        let mut rooftop_shadow_area = 0.0;
        let mut vertical_shadow_area = 0.0;

        for face in faces {
            if face.degenerate {
                agg.degenerate_faces += 1;
                continue;
            }
            match face.orientation {
                Orientation::Rooftop => {
                    agg.rooftop_area += face.area;
                    rooftop_shadow_area += face.area * face.shadow_fraction;
                }
                Orientation::Vertical => {
                    agg.vertical_area += face.area;
                    vertical_shadow_area += face.area * face.shadow_fraction;
                }
            }
        }

        agg.total_area = agg.rooftop_area + agg.vertical_area;
        agg.rooftop_shadow_fraction = weighted(rooftop_shadow_area, agg.rooftop_area);
        agg.vertical_shadow_fraction = weighted(vertical_shadow_area, agg.vertical_area);
        agg.total_shadow_fraction =
            weighted(rooftop_shadow_area + vertical_shadow_area, agg.total_area);

        if lit {
            agg.total_pv_value = config.ghi
                * agg.total_area
                * (1.0 - agg.total_shadow_fraction)
                * config.efficiency;
            agg.rooftop_pv_value = config.ghi
                * agg.rooftop_area
                * (1.0 - agg.rooftop_shadow_fraction * config.rooftop_shadow_scale)
                * config.efficiency;
        }

        agg
    }
}

fn weighted(shadow_area: f64, area: f64) -> f64 {
    if area > 0.0 { shadow_area / area } else { 0.0 }
}

/// Result of a PV estimate for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvEstimate {
    pub faces: Vec<FaceResult>,
    pub aggregates: PvAggregates,
}

impl PvEstimate {
    pub fn pv_values(&self) -> Vec<f64> {
        self.faces.iter().map(|f| f.pv_value).collect()
    }
}

/// Summary record handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingReport {
    pub building_name: String,
    pub total_daytime_hours: f64,
    pub total_area: f64,
    pub rooftop_area: f64,
    pub total_shadow_fraction: f64,
    pub rooftop_shadow_fraction: f64,
    pub total_pv_value: f64,
    pub rooftop_pv_value: f64,
}

impl BuildingReport {
    pub fn new(building_name: &str, total_daytime_hours: f64, agg: &PvAggregates) -> Self {
        Self {
            building_name: building_name.to_string(),
            total_daytime_hours,
            total_area: agg.total_area,
            rooftop_area: agg.rooftop_area,
            total_shadow_fraction: agg.total_shadow_fraction,
            rooftop_shadow_fraction: agg.rooftop_shadow_fraction,
            total_pv_value: agg.total_pv_value,
            rooftop_pv_value: agg.rooftop_pv_value,
        }
    }
}
