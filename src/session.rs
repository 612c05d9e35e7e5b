//! Explicit application state: location, sun, scene, buildings and the
//! current selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EstimateError, EstimateResult};
use crate::scene::{Building, DEFAULT_BUILDING_COLOR, Scene, Selection};
use crate::sim::color::face_vertex_colors;
use crate::sim::{BuildingReport, CancelToken, PvConfig, PvEstimate, calculate_building_pv};
use crate::sun::{DirectionalLight, LightConfig, Location, SunLight, SunPosition, daylight_hours};

/// Everything that can be loaded from a JSON configuration file.
///
/// Missing keys fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub location: Location,
    pub light: LightConfig,
    pub pv: PvConfig,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }
}

/// A PV estimate that has been requested but not yet applied.
///
/// Can be run off the UI thread with [`Session::run`]; a newer request
/// cancels it and makes its result stale.
#[derive(Debug, Clone)]
pub struct EstimateRequest {
    pub generation: u64,
    /// Index into [`Session::buildings`].
    pub building: usize,
    pub light: DirectionalLight,
    cancel: CancelToken,
}

pub struct Session {
    location: Location,
    light_config: LightConfig,
    pv_config: PvConfig,
    date: Option<NaiveDate>,
    light: SunLight,
    scene: Scene,
    buildings: Vec<Building>,
    selection: Selection,
    generation: u64,
    in_flight: Option<CancelToken>,
}

impl Session {
    pub fn new(scene: Scene, buildings: Vec<Building>, config: SessionConfig) -> Self {
        info!(
            "Session with {} scene objects, {} buildings at ({}, {})",
            scene.objects().len(),
            buildings.len(),
            config.location.latitude,
            config.location.longitude
        );
        Self {
            location: config.location,
            light_config: config.light,
            pv_config: config.pv,
            date: None,
            light: SunLight::new(),
            scene,
            buildings,
            selection: Selection::new(),
            generation: 0,
            in_flight: None,
        }
    }

    /// Session whose buildings are the scene objects tagged `"building"`.
    pub fn from_scene(scene: Scene, config: SessionConfig) -> Self {
        let buildings = scene
            .objects()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_building())
            .map(|(i, o)| Building::new(&o.name, i, DEFAULT_BUILDING_COLOR))
            .collect();
        Self::new(scene, buildings, config)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn pv_config(&self) -> &PvConfig {
        &self.pv_config
    }

    pub fn pv_config_mut(&mut self) -> &mut PvConfig {
        &mut self.pv_config
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn sun(&self) -> Option<SunPosition> {
        self.light.sun
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light.light
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, name: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.name == name)
    }

    pub fn selected(&self) -> Option<&Building> {
        self.selection.current().and_then(|i| self.buildings.get(i))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recomputes the sun and the light for a local date and time of day.
    ///
    /// On error the previous sun, light and date are kept.
    pub fn set_datetime(
        &mut self,
        date: Option<NaiveDate>,
        minutes: Option<f64>,
    ) -> EstimateResult<SunPosition> {
        let sun = self
            .light
            .update(date, minutes, &self.location, &self.light_config)?;
        self.date = date;
        Ok(sun)
    }

    /// Daylight hours of the current date.
    pub fn daylight_hours(&self) -> EstimateResult<f64> {
        daylight_hours(self.date, &self.location)
    }

    /// Estimates the PV of `name`, then highlights it and stores the per-face colors.
    pub fn select_building(&mut self, name: &str) -> EstimateResult<BuildingReport> {
        let request = self.request_estimate(name)?;
        let result = self.run(&request);
        self.apply(&request, result)
    }

    /// Prepares an estimate for `name` without touching the current highlight.
    ///
    /// Fails with `UnsupportedGeometry` if the building has no indexed mesh.
    /// Any earlier request still in flight is cancelled.
    pub fn request_estimate(&mut self, name: &str) -> EstimateResult<EstimateRequest> {
        if self.light.sun.is_none() {
            return Err(EstimateError::InvalidInput(
                "date and time must be set before selecting a building".to_string(),
            ));
        }
        let idx = self
            .buildings
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| EstimateError::InvalidInput(format!("unknown building '{name}'")))?;
        let object = self
            .scene
            .object(self.buildings[idx].object_index)
            .ok_or_else(|| {
                EstimateError::UnsupportedGeometry(format!(
                    "building '{name}' has no scene geometry"
                ))
            })?;
        if object.mesh.faces().is_none() {
            return Err(EstimateError::UnsupportedGeometry(format!(
                "building '{name}' has no triangle index"
            )));
        }

        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;

        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());
        debug!("Estimate #{} requested for '{}'", self.generation, name);
        Ok(EstimateRequest {
            generation: self.generation,
            building: idx,
            light: self.light.light,
            cancel,
        })
    }

    /// Runs a requested estimate against the whole scene.
    pub fn run(&self, request: &EstimateRequest) -> EstimateResult<PvEstimate> {
        let building = self.buildings.get(request.building).ok_or_else(|| {
            EstimateError::InvalidInput(format!("no building with index {}", request.building))
        })?;
        let object = self.scene.object(building.object_index).ok_or_else(|| {
            EstimateError::UnsupportedGeometry(format!(
                "building '{}' has no scene geometry",
                building.name
            ))
        })?;
        calculate_building_pv(
            &object.mesh,
            &request.light,
            &self.scene,
            &self.pv_config,
            Some(&request.cancel),
        )
    }

    /// Highlights the building of `request` and stores its estimate.
    ///
    /// Results of a superseded request are discarded with `Cancelled`. A failed
    /// estimate leaves every building and the selection as they were.
    pub fn apply(
        &mut self,
        request: &EstimateRequest,
        result: EstimateResult<PvEstimate>,
    ) -> EstimateResult<BuildingReport> {
        if request.generation != self.generation {
            debug!(
                "Discarding stale estimate #{} (current #{})",
                request.generation, self.generation
            );
            return Err(EstimateError::Cancelled);
        }
        self.in_flight = None;
        let estimate = result.inspect_err(|e| warn!("PV estimate failed: {e}"))?;
        let hours = self.daylight_hours()?;

        self.selection.highlight(&mut self.buildings, request.building)?;
        let building = &mut self.buildings[request.building];
        building.face_colors = Some(face_vertex_colors(&estimate.pv_values()));
        building.summary = Some(estimate.aggregates);

        let report = BuildingReport::new(&building.name, hours, &estimate.aggregates);
        info!(
            "'{}': pv={:.3} rooftop_pv={:.3} shadow={:.3} daylight={:.2} h",
            report.building_name,
            report.total_pv_value,
            report.rooftop_pv_value,
            report.total_shadow_fraction,
            report.total_daytime_hours
        );
        Ok(report)
    }

    /// Reverts the highlighted building, if any.
    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        self.selection.clear(&mut self.buildings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::mesh::Mesh;
    use crate::scene::{Material, SceneObject};
    use crate::{Point, TriangleIndex};

    fn square(y: f64, x0: f64, z0: f64, size: f64) -> Mesh {
        let vertices = vec![
            Point::new(x0, y, z0),
            Point::new(x0 + size, y, z0),
            Point::new(x0 + size, y, z0 + size),
            Point::new(x0, y, z0 + size),
        ];
        Mesh::new(
            vertices,
            Some(vec![TriangleIndex(0, 2, 1), TriangleIndex(0, 3, 2)]),
        )
    }

    fn session() -> Session {
        let scene = Scene::new(vec![
            SceneObject::new("ground", "ground", square(-1.0, -50.0, -50.0, 100.0)),
            SceneObject::new("a", "building", square(0.0, 0.0, 0.0, 2.0)),
            SceneObject::new("b", "building", square(0.0, 10.0, 10.0, 2.0)),
            SceneObject::new("dome", "sky", square(200.0, -500.0, -500.0, 1000.0)),
        ]);
        let config = SessionConfig {
            pv: PvConfig::new().with_seed(11),
            ..SessionConfig::default()
        };
        Session::from_scene(scene, config)
    }

    fn noon(s: &mut Session) {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21);
        s.set_datetime(date, Some(720.0)).unwrap();
    }

    #[test]
    fn test_buildings_from_tags() {
        let s = session();
        let names: Vec<&str> = s.buildings().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(s.buildings()[1].object_index, 2);
    }

    #[test]
    fn test_select_before_datetime_fails() {
        let mut s = session();
        let err = s.select_building("a").unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput(_)));
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_invalid_datetime_keeps_state() {
        let mut s = session();
        noon(&mut s);
        let sun = s.sun();
        let date = s.date();
        assert!(s.set_datetime(None, Some(10.0)).is_err());
        assert!(s.set_datetime(date, Some(-1.0)).is_err());
        assert!(s.set_datetime(date, None).is_err());
        assert_eq!(s.sun(), sun);
        assert_eq!(s.date(), date);
    }

    #[test]
    fn test_select_building_report() {
        let mut s = session();
        noon(&mut s);
        let report = s.select_building("a").unwrap();
        assert_eq!(report.building_name, "a");
        assert!((report.total_area - 4.0).abs() < 1e-12);
        assert!((report.rooftop_area - 4.0).abs() < 1e-12);
        // Hong Kong at the June solstice
        assert!(report.total_daytime_hours > 13.0 && report.total_daytime_hours < 14.0);
        assert_eq!(report.total_shadow_fraction, 0.0);
        assert!((report.total_pv_value - 3.3).abs() < 1e-9);

        let a = s.building("a").unwrap();
        assert!(a.is_highlighted());
        assert_eq!(a.face_colors.as_ref().map(Vec::len), Some(6));
        assert!(a.summary.is_some());
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut s = session();
        noon(&mut s);
        s.select_building("a").unwrap();
        s.select_building("b").unwrap();
        let a = s.building("a").unwrap();
        assert_eq!(a.material, Material::Original(DEFAULT_BUILDING_COLOR));
        assert!(a.face_colors.is_none());
        assert!(s.building("b").unwrap().is_highlighted());
        assert_eq!(s.selected().map(|b| b.name.as_str()), Some("b"));

        s.clear_selection();
        assert!(s.buildings().iter().all(|b| !b.is_highlighted()));
    }

    #[test]
    fn test_unknown_building() {
        let mut s = session();
        noon(&mut s);
        s.select_building("a").unwrap();
        let err = s.select_building("nope").unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput(_)));
        // The previous selection is untouched
        assert!(s.building("a").unwrap().is_highlighted());
    }

    #[test]
    fn test_unsupported_building_keeps_selection() {
        let mut s = session();
        let raw = Mesh::new(square(0.0, 20.0, 20.0, 2.0).vertices().to_vec(), None);
        s.scene.push(SceneObject::new("raw", "building", raw));
        s.buildings.push(Building::new("raw", 4, DEFAULT_BUILDING_COLOR));
        noon(&mut s);

        s.select_building("a").unwrap();
        let before = s.building("a").cloned();
        let err = s.select_building("raw").unwrap_err();
        assert!(matches!(err, EstimateError::UnsupportedGeometry(_)));

        assert_eq!(s.building("a").cloned(), before);
        assert!(s.building("a").unwrap().face_colors.is_some());
        assert!(!s.building("raw").unwrap().is_highlighted());
        assert_eq!(s.selected().map(|b| b.name.as_str()), Some("a"));
    }

    #[test]
    fn test_failed_estimate_keeps_selection() {
        let mut s = session();
        noon(&mut s);
        s.select_building("a").unwrap();
        let before = s.buildings().to_vec();

        let request = s.request_estimate("b").unwrap();
        let failed = Err(EstimateError::UnsupportedGeometry("broken".to_string()));
        assert!(s.apply(&request, failed).is_err());
        assert_eq!(s.buildings(), &before[..]);
        assert_eq!(s.selected().map(|b| b.name.as_str()), Some("a"));
    }

    #[test]
    fn test_stale_request_is_discarded() {
        let mut s = session();
        noon(&mut s);
        let first = s.request_estimate("a").unwrap();
        let second = s.request_estimate("b").unwrap();
        assert!(second.generation > first.generation);

        assert_eq!(s.run(&first).unwrap_err(), EstimateError::Cancelled);
        let result = s.run(&second);
        assert!(result.is_ok());
        let stale = s.apply(&first, result.clone());
        assert_eq!(stale.unwrap_err(), EstimateError::Cancelled);
        assert!(s.building("b").unwrap().summary.is_none());

        let report = s.apply(&second, result).unwrap();
        assert_eq!(report.building_name, "b");
        assert!(s.building("b").unwrap().summary.is_some());
    }

    #[test]
    fn test_night_selection_has_no_pv() {
        let mut s = session();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21);
        s.set_datetime(date, Some(0.0)).unwrap();
        let report = s.select_building("a").unwrap();
        assert_eq!(report.total_pv_value, 0.0);
        assert_eq!(report.rooftop_pv_value, 0.0);
        assert_eq!(report.total_shadow_fraction, 1.0);
    }

    #[test]
    fn test_config_from_json() -> anyhow::Result<()> {
        let config = SessionConfig::from_json(
            r#"{"location": {"latitude": 51.5, "longitude": -0.1}, "pv": {"ghi": 4.0}}"#,
        )?;
        assert_eq!(config.location.latitude, 51.5);
        assert_eq!(config.location.utc_offset_hours, Location::DEFAULT.utc_offset_hours);
        assert_eq!(config.pv.ghi, 4.0);
        assert_eq!(config.pv.sample_count, 50);
        assert_eq!(config.light, LightConfig::new());
        Ok(())
    }
}
