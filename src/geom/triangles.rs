use crate::Point;
use crate::geom::vector::Vector;
use serde::{Deserialize, Serialize};

/// Ratio of `|e0 x e1|` to the squared longest edge below which a
/// triangle is treated as degenerate.
///
/// The ratio is `sin` of the widest angle, so it does not depend on scale.
pub const MIN_TRIANGLE_SHAPE: f64 = 1e-10;

/// Type for holding vertex indices for a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleIndex(pub usize, pub usize, pub usize);

impl TriangleIndex {
    pub fn as_array(&self) -> [usize; 3] {
        [self.0, self.1, self.2]
    }
}

/// Derived geometric attributes of a single triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    pub centroid: Point,
    pub area: f64,
    /// Unit normal following the right-hand rule on (p0, p1, p2).
    pub normal: Vector,
}

impl FaceGeometry {
    /// Computes centroid, area and unit normal of the triangle.
    ///
    /// Returns `None` for degenerate triangles (zero area, collinear or
    /// non-finite vertices). Small but well-shaped triangles are kept.
    pub fn new(p0: Point, p1: Point, p2: Point) -> Option<Self> {
        let e0 = p1 - p0;
        let e1 = p2 - p0;
        let cross = e0.cross(&e1);
        let cross_len = cross.length();
        let longest = e0.length().max(e1.length()).max((p2 - p1).length());
        if !cross_len.is_finite() || !longest.is_finite() || longest == 0.0 {
            return None;
        }
        if cross_len <= MIN_TRIANGLE_SHAPE * longest * longest {
            return None;
        }
        let area = 0.5 * cross_len;
        let normal = cross * (1.0 / cross_len);
        let centroid = Point::mean(&[p0, p1, p2])?;
        Some(Self {
            centroid,
            area,
            normal,
        })
    }
}
