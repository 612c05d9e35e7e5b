use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::location::Location;
use super::position::SunPosition;
use crate::error::EstimateResult;
use crate::{Point, Vector};

/// Configuration of the sun light source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Radius of the sphere (around the origin) the light is placed on.
    pub radius: f64,
    /// Intensity while the sun is above the horizon.
    pub nominal_intensity: f64,
}

impl LightConfig {
    pub fn new() -> Self {
        Self {
            radius: 1500.0,
            nominal_intensity: 5.0,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Places the light on a sphere of `radius` around the origin. Y is up.
pub fn compute_light_vector(azimuth: f64, altitude: f64, radius: f64) -> Vector {
    Vector::new(
        radius * azimuth.cos() * altitude.cos(),
        radius * altitude.sin(),
        radius * azimuth.sin() * altitude.cos(),
    )
}

/// A directional light aimed at a fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub position: Point,
    pub intensity: f64,
    pub target: Point,
}

impl DirectionalLight {
    /// Light for the given sun position.
    ///
    /// Intensity snaps to 0 below the horizon instead of modelling attenuation.
    pub fn from_sun(sun: &SunPosition, config: &LightConfig) -> Self {
        let v = compute_light_vector(sun.azimuth, sun.altitude, config.radius);
        let intensity = if sun.altitude < 0.0 {
            0.0
        } else {
            config.nominal_intensity
        };
        Self {
            position: Point::origin() + v,
            intensity,
            target: Point::origin(),
        }
    }

    /// Returns true if the light contributes direct irradiance.
    pub fn is_lit(&self) -> bool {
        self.intensity > 0.0
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        // Sun at the zenith until the first date/time is set
        Self {
            position: Point::new(0.0, LightConfig::new().radius, 0.0),
            intensity: 0.0,
            target: Point::origin(),
        }
    }
}

/// Sun state plus the light derived from it.
#[derive(Debug, Clone, Default)]
pub struct SunLight {
    pub sun: Option<SunPosition>,
    pub light: DirectionalLight,
}

impl SunLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the sun and light for a local date and time of day.
    ///
    /// On `InvalidInput` nothing is modified.
    pub fn update(
        &mut self,
        date: Option<NaiveDate>,
        minutes: Option<f64>,
        location: &Location,
        config: &LightConfig,
    ) -> EstimateResult<SunPosition> {
        let sun = SunPosition::calculate(date, minutes, location)?;
        let light = DirectionalLight::from_sun(&sun, config);
        debug!(
            "Sun azimuth={:.4} altitude={:.4} rad, light intensity={}",
            sun.azimuth, sun.altitude, light.intensity
        );
        self.sun = Some(sun);
        self.light = light;
        Ok(sun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_vector_on_sphere() {
        let radius = 1500.0;
        for i in 0..24 {
            for j in -6..=6 {
                let az = i as f64 * std::f64::consts::PI / 12.0 - std::f64::consts::PI;
                let alt = j as f64 * std::f64::consts::PI / 12.0;
                let v = compute_light_vector(az, alt, radius);
                assert!((v.length() - radius).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_light_vector_zenith() {
        let v = compute_light_vector(0.3, std::f64::consts::FRAC_PI_2, 10.0);
        assert!((v.dy - 10.0).abs() < 1e-12);
        assert!(v.dx.abs() < 1e-12 && v.dz.abs() < 1e-12);
    }

    #[test]
    fn test_intensity_snaps_to_zero_below_horizon() {
        let config = LightConfig::new();
        for alt_deg in [-89.0, -30.0, -0.001] {
            let sun = SunPosition {
                azimuth: 1.0,
                altitude: f64::to_radians(alt_deg),
            };
            assert_eq!(DirectionalLight::from_sun(&sun, &config).intensity, 0.0);
        }
        for alt_deg in [0.0, 0.001, 45.0, 90.0] {
            let sun = SunPosition {
                azimuth: 1.0,
                altitude: f64::to_radians(alt_deg),
            };
            let light = DirectionalLight::from_sun(&sun, &config);
            assert_eq!(light.intensity, 5.0);
            assert!(light.target.is_close(&Point::origin()));
        }
    }

    #[test]
    fn test_update_invalid_input_leaves_state_untouched() {
        let mut state = SunLight::new();
        let loc = Location::default();
        let config = LightConfig::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21);
        state.update(date, Some(720.0), &loc, &config).unwrap();
        let before = state.light;
        let sun_before = state.sun;

        assert!(state.update(None, Some(600.0), &loc, &config).is_err());
        assert!(state.update(date, Some(5000.0), &loc, &config).is_err());
        assert_eq!(state.light, before);
        assert_eq!(state.sun, sun_before);
    }

    #[test]
    fn test_update_midnight_is_dark() {
        let mut state = SunLight::new();
        let loc = Location::default();
        let date = NaiveDate::from_ymd_opt(2024, 12, 21);
        let sun = state
            .update(date, Some(0.0), &loc, &LightConfig::new())
            .unwrap();
        assert!(sun.altitude < 0.0);
        assert!(!state.light.is_lit());
    }
}
