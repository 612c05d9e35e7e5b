pub mod bboxes;
pub mod mesh;
pub mod point;
pub mod ray;
pub mod triangles;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-13;

/// Unit vector pointing up (the scene is Y-up).
pub const UP: vector::Vector = vector::Vector {
    dx: 0.,
    dy: 1.,
    dz: 0.,
};

