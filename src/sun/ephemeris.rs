//! Low-level solar ephemeris terms.
//!
//! Time is expressed in days since the J2000 epoch. Formulas follow the
//! well-known SunCalc model (Astronomy Answers approximations).

use chrono::{DateTime, TimeZone, Utc};
use std::f64::consts::PI;

const RAD: f64 = PI / 180.0;
const DAY_MS: f64 = 1000.0 * 60.0 * 60.0 * 24.0;
const J1970: f64 = 2440588.0;
pub const J2000: f64 = 2451545.0;
/// Obliquity of the Earth.
const OBLIQUITY: f64 = RAD * 23.4397;
/// Correction used when rounding to the closest solar transit.
pub const J0: f64 = 0.0009;

pub fn to_julian(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

/// Converts a Julian date back to an instant. `None` if out of chrono's range.
pub fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    if !j.is_finite() {
        return None;
    }
    let ms = ((j + 0.5 - J1970) * DAY_MS).round();
    Utc.timestamp_millis_opt(ms as i64).single()
}

pub fn to_days(instant: DateTime<Utc>) -> f64 {
    to_julian(instant) - J2000
}

pub fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

pub fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

/// Azimuth measured from south, positive toward west.
pub fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

pub fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

/// `lw` is the west longitude in radians.
pub fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.9856235 * d) - lw
}

pub fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.98560028 * d)
}

pub fn ecliptic_longitude(m: f64) -> f64 {
    // Equation of center
    let c = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    // Perihelion of the Earth
    let p = RAD * 102.9372;
    m + c + p + PI
}

/// Declination and right ascension of the sun at `d` days since J2000.
pub fn sun_coords(d: f64) -> (f64, f64) {
    let m = solar_mean_anomaly(d);
    let l = ecliptic_longitude(m);
    (declination(l, 0.0), right_ascension(l, 0.0))
}

pub fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2.0 * PI)).round()
}

pub fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

pub fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// Cosine of the hour angle at which the sun reaches altitude `h`.
///
/// Values outside [-1, 1] mean the sun never crosses that altitude on this day.
pub fn cos_hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    (h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_julian_roundtrip() {
        let instant = Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap();
        let j = to_julian(instant);
        assert!((j - 2456356.5).abs() < 1e-9);
        assert_eq!(from_julian(j), Some(instant));
        assert!(from_julian(f64::NAN).is_none());
    }

    #[test]
    fn test_j2000_epoch() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!(to_days(epoch).abs() < 1e-9);
    }
}
