use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ephemeris::{altitude, azimuth, sidereal_time, sun_coords, to_days};
use super::location::{Location, local_datetime};
use crate::error::EstimateResult;

/// Sun position (azimuth and altitude angles) in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// Azimuth measured from south, positive toward west.
    pub azimuth: f64,
    /// Altitude above the horizon; negative below it.
    pub altitude: f64,
}

impl SunPosition {
    /// Calculates the sun position at a UTC instant.
    pub fn at(instant: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        let lw = (-longitude).to_radians();
        let phi = latitude.to_radians();
        let d = to_days(instant);

        let (dec, ra) = sun_coords(d);
        let h = sidereal_time(d, lw) - ra;

        Self {
            azimuth: azimuth(h, phi, dec),
            altitude: altitude(h, phi, dec),
        }
    }

    /// Calculates the sun position for a local date and time of day.
    ///
    /// - `date`: local calendar date
    /// - `minutes`: minutes since local midnight (0-1440)
    ///
    /// Returns `InvalidInput` if either value is absent or out of range.
    pub fn calculate(
        date: Option<NaiveDate>,
        minutes: Option<f64>,
        location: &Location,
    ) -> EstimateResult<Self> {
        let instant = local_datetime(date, minutes, location)?;
        Ok(Self::at(instant, location.latitude, location.longitude))
    }

    /// Returns true if the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.altitude >= 0.0
    }
}
