use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ephemeris::{
    approx_transit, cos_hour_angle, declination, ecliptic_longitude, from_julian,
    julian_cycle, solar_mean_anomaly, solar_transit_j, to_days,
};
use super::location::{Location, local_datetime};
use crate::error::{EstimateError, EstimateResult};

/// Sun altitude at sunrise/sunset, accounting for refraction and the solar disc.
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Sunrise, sunset and solar noon of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
}

/// Sunrise, sunset and solar noon for a local date.
///
/// Returns `Ok(None)` when the sun does not cross the horizon that day
/// (polar day or polar night).
pub fn sun_times(
    date: Option<NaiveDate>,
    location: &Location,
) -> EstimateResult<Option<SunTimes>> {
    let Some(day) = day_geometry(date, location)? else {
        return Ok(None);
    };
    Ok(day.times())
}

/// Daylight duration (sunset - sunrise) in hours.
///
/// Boundary case: if the sun never crosses the horizon, returns 24.0 when it
/// stays above it (polar day) and 0.0 when it stays below (polar night).
pub fn daylight_hours(date: Option<NaiveDate>, location: &Location) -> EstimateResult<f64> {
    let Some(day) = day_geometry(date, location)? else {
        return Ok(0.0);
    };
    match day.times() {
        Some(times) => {
            let ms = (times.sunset - times.sunrise).num_milliseconds() as f64;
            Ok(ms / 3_600_000.0)
        }
        None if day.cos_h < -1.0 => {
            debug!("Polar day at latitude {}", location.latitude);
            Ok(24.0)
        }
        None => {
            debug!("Polar night at latitude {}", location.latitude);
            Ok(0.0)
        }
    }
}

/// Intermediate quantities shared by the sunrise/sunset routines.
struct DayGeometry {
    lw: f64,
    n: f64,
    m: f64,
    l: f64,
    j_noon: f64,
    cos_h: f64,
}

impl DayGeometry {
    fn times(&self) -> Option<SunTimes> {
        if !(-1.0..=1.0).contains(&self.cos_h) {
            return None;
        }
        let w = self.cos_h.acos();
        let a = approx_transit(w, self.lw, self.n);
        let j_set = solar_transit_j(a, self.m, self.l);
        let j_rise = self.j_noon - (j_set - self.j_noon);
        Some(SunTimes {
            sunrise: from_julian(j_rise)?,
            sunset: from_julian(j_set)?,
            solar_noon: from_julian(self.j_noon)?,
        })
    }
}

fn day_geometry(
    date: Option<NaiveDate>,
    location: &Location,
) -> EstimateResult<Option<DayGeometry>> {
    let date = date.ok_or_else(|| EstimateError::InvalidInput("date is missing".to_string()))?;
    // Local noon identifies the day unambiguously
    let instant = local_datetime(Some(date), Some(720.0), location)?;

    let lw = (-location.longitude).to_radians();
    let phi = location.latitude.to_radians();
    let d = to_days(instant);

    let n = julian_cycle(d, lw);
    let ds = approx_transit(0.0, lw, n);
    let m = solar_mean_anomaly(ds);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);
    let j_noon = solar_transit_j(ds, m, l);
    let cos_h = cos_hour_angle(SUNRISE_ALTITUDE_DEG.to_radians(), phi, dec);

    if !cos_h.is_finite() {
        // Undefined hour angle
        return Ok(None);
    }

    Ok(Some(DayGeometry {
        lw,
        n,
        m,
        l,
        j_noon,
        cos_h,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_equator_equinox_has_twelve_hours() {
        let loc = Location::new(0.0, 0.0, 0.0);
        let hours = daylight_hours(date(2024, 3, 20), &loc).unwrap();
        // Refraction and the disc radius add a few minutes
        assert!((hours - 12.1).abs() < 0.1, "got {hours}");
    }

    #[test]
    fn test_sunrise_before_noon_before_sunset() {
        let loc = Location::default();
        let times = sun_times(date(2024, 6, 21), &loc).unwrap().unwrap();
        assert!(times.sunrise < times.solar_noon);
        assert!(times.solar_noon < times.sunset);
        let hours = daylight_hours(date(2024, 6, 21), &loc).unwrap();
        assert!(hours > 13.0 && hours < 14.0, "got {hours}");
    }

    #[test]
    fn test_summer_longer_than_winter() {
        let loc = Location::new(50.0, 10.0, 1.0);
        let summer = daylight_hours(date(2024, 6, 21), &loc).unwrap();
        let winter = daylight_hours(date(2024, 12, 21), &loc).unwrap();
        assert!(summer > winter);
    }

    #[test]
    fn test_polar_day_and_night() {
        let loc = Location::new(78.2, 15.6, 1.0); // Svalbard
        assert!(sun_times(date(2024, 6, 21), &loc).unwrap().is_none());
        assert_eq!(daylight_hours(date(2024, 6, 21), &loc).unwrap(), 24.0);
        assert_eq!(daylight_hours(date(2024, 12, 21), &loc).unwrap(), 0.0);

        let pole = Location::new(90.0, 0.0, 0.0);
        let hours = daylight_hours(date(2024, 6, 21), &pole).unwrap();
        assert!(hours.is_finite());
    }

    #[test]
    fn test_missing_date() {
        let loc = Location::default();
        assert!(matches!(
            daylight_hours(None, &loc),
            Err(EstimateError::InvalidInput(_))
        ));
    }
}
