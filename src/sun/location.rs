use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, EstimateResult};

/// Minutes in a day; the upper bound of the time-of-day input.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Geographic location of the analysed city model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Latitude in degrees (positive north).
    pub latitude: f64,
    /// Longitude in degrees (positive east).
    pub longitude: f64,
    /// Offset of local clock time from UTC in hours.
    pub utc_offset_hours: f64,
}

impl Location {
    /// Hong Kong, the default city model location.
    pub const DEFAULT: Location = Location {
        latitude: 22.3193,
        longitude: 114.1694,
        utc_offset_hours: 8.0,
    };

    pub fn new(latitude: f64, longitude: f64, utc_offset_hours: f64) -> Self {
        Self {
            latitude,
            longitude,
            utc_offset_hours,
        }
    }

    /// Checks that the coordinates are finite and within the valid ranges.
    pub fn validate(&self) -> EstimateResult<()> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(EstimateError::InvalidInput(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(EstimateError::InvalidInput(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if !self.utc_offset_hours.is_finite() || self.utc_offset_hours.abs() > 14.0 {
            return Err(EstimateError::InvalidInput(format!(
                "UTC offset out of range: {}",
                self.utc_offset_hours
            )));
        }
        Ok(())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Converts a local calendar date and minutes since local midnight to a UTC instant.
///
/// Fails with `InvalidInput` if either value is missing, or if `minutes` is not
/// a finite number within `0..=1440`.
pub fn local_datetime(
    date: Option<NaiveDate>,
    minutes: Option<f64>,
    location: &Location,
) -> EstimateResult<DateTime<Utc>> {
    let date = date.ok_or_else(|| EstimateError::InvalidInput("date is missing".to_string()))?;
    let minutes = minutes
        .ok_or_else(|| EstimateError::InvalidInput("time of day is missing".to_string()))?;
    if !minutes.is_finite() || !(0.0..=MINUTES_PER_DAY).contains(&minutes) {
        return Err(EstimateError::InvalidInput(format!(
            "time of day must be within 0..=1440 minutes, got {minutes}"
        )));
    }
    location.validate()?;

    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| EstimateError::InvalidInput(format!("invalid date: {date}")))?;
    let offset_ms = (location.utc_offset_hours * 3_600_000.0).round() as i64;
    let local_ms = (minutes * 60_000.0).round() as i64;
    let naive = midnight
        .checked_add_signed(Duration::milliseconds(local_ms - offset_ms))
        .ok_or_else(|| EstimateError::InvalidInput(format!("date out of range: {date}")))?;

    Ok(naive.and_utc())
}
