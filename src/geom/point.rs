use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0., 0., 0.)
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }

    /// Returns true if both points are within `tol` along every axis.
    pub fn is_close_tol(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }

    /// Arithmetic mean of the given points. Returns `None` for an empty slice.
    pub fn mean(pts: &[Point]) -> Option<Self> {
        if pts.is_empty() {
            return None;
        }
        let n = pts.len() as f64;
        let (sx, sy, sz) = pts
            .iter()
            .fold((0., 0., 0.), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
        Some(Self::new(sx / n, sy / n, sz / n))
    }

    /// Distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Point({:.prec$}, {:.prec$}, {:.prec$})",
            self.x,
            self.y,
            self.z,
            prec = prec
        )
    }
}

// Implement +
impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, other: Vector) -> Self {
        Self {
            x: self.x + other.dx,
            y: self.y + other.dy,
            z: self.z + other.dz,
        }
    }
}

// Implement - (point - point = vector from other to self)
impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::from_points(other, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close() {
        let pa = Point::new(5., 5., 5.);
        let pb = Point::new(5.00000000000001, 5., 5.);
        let pc = Point::new(5.0001, 5., 5.);
        assert!(pa.is_close(&pb));
        assert!(!pa.is_close(&pc));
        assert!(pa.is_close_tol(&pc, 1e-3));
    }

    #[test]
    fn test_mean() {
        let pts = [
            Point::new(0., 0., 0.),
            Point::new(3., 0., 0.),
            Point::new(0., 3., 0.),
        ];
        let c = Point::mean(&pts).unwrap();
        assert!(c.is_close(&Point::new(1., 1., 0.)));
        assert!(Point::mean(&[]).is_none());
    }

    #[test]
    fn test_sub() {
        let p0 = Point::new(1., 1., 1.);
        let p1 = Point::new(4., 5., 1.);
        let v = p1 - p0;
        assert!(v.is_close(&Vector::new(3., 4., 0.)));
    }
}
