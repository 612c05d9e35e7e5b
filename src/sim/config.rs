use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, EstimateResult};

/// Configuration of the shadow and PV estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvConfig {
    /// Global horizontal irradiance.
    pub ghi: f64,
    /// Number of jittered shadow rays per face.
    pub sample_count: usize,
    /// Half-width of the uniform per-axis jitter added to the light direction.
    pub jitter: f64,
    /// Simplified panel efficiency.
    pub efficiency: f64,
    /// Empirical factor applied to the rooftop shadow fraction for the rooftop PV value.
    pub rooftop_shadow_scale: f64,
    /// A face is vertical if its normal is within this many degrees of horizontal.
    pub vertical_tolerance_deg: f64,
    /// Shadow rays start this far from the face along its normal.
    pub origin_offset: f64,
    /// Seed of the jitter source. `None` draws from system entropy.
    pub seed: Option<u64>,
    /// Sample faces on the rayon thread pool.
    pub parallel: bool,
}

impl PvConfig {
    pub fn new() -> Self {
        Self {
            ghi: 5.5,
            sample_count: 50,
            jitter: 0.01,
            efficiency: 0.15,
            rooftop_shadow_scale: 0.1753,
            vertical_tolerance_deg: 1.0,
            origin_offset: 1e-3,
            seed: None,
            parallel: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> EstimateResult<()> {
        let invalid = |msg: String| Err(EstimateError::InvalidInput(msg));
        if !self.ghi.is_finite() || self.ghi < 0.0 {
            return invalid(format!("GHI must be a non-negative number, got {}", self.ghi));
        }
        if self.sample_count == 0 {
            return invalid("sample count must be at least 1".to_string());
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return invalid(format!("jitter must be non-negative, got {}", self.jitter));
        }
        if !self.efficiency.is_finite() {
            return invalid(format!("efficiency must be finite, got {}", self.efficiency));
        }
        if !self.rooftop_shadow_scale.is_finite() {
            return invalid(format!(
                "rooftop shadow scale must be finite, got {}",
                self.rooftop_shadow_scale
            ));
        }
        if !self.vertical_tolerance_deg.is_finite() || self.vertical_tolerance_deg < 0.0 {
            return invalid(format!(
                "vertical tolerance must be non-negative, got {}",
                self.vertical_tolerance_deg
            ));
        }
        if !self.origin_offset.is_finite() || self.origin_offset < 0.0 {
            return invalid(format!(
                "origin offset must be non-negative, got {}",
                self.origin_offset
            ));
        }
        Ok(())
    }
}

impl Default for PvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PvConfig::new();
        assert_eq!(config.ghi, 5.5);
        assert_eq!(config.sample_count, 50);
        assert_eq!(config.efficiency, 0.15);
        assert_eq!(config.rooftop_shadow_scale, 0.1753);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_override() {
        let config: PvConfig = serde_json::from_str(r#"{"ghi": 4.0, "seed": 7}"#).unwrap();
        assert_eq!(config.ghi, 4.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sample_count, 50);
    }

    #[test]
    fn test_validate() {
        let mut config = PvConfig::new();
        config.sample_count = 0;
        assert!(config.validate().is_err());

        let mut config = PvConfig::new();
        config.ghi = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PvConfig::new();
        config.jitter = -0.1;
        assert!(config.validate().is_err());
    }
}
