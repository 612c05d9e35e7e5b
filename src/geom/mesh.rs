use anyhow::{Result, anyhow};

use crate::geom::bboxes::bounding_box;
use crate::geom::triangles::FaceGeometry;
use crate::{Point, TriangleIndex, Vector};

/// Triangulated surface: vertex positions plus an optional triangle index.
///
/// A mesh without `faces` is "non-indexed" and cannot be analysed per face.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point>,
    pub faces: Option<Vec<TriangleIndex>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point>, faces: Option<Vec<TriangleIndex>>) -> Self {
        Self { vertices, faces }
    }

    /// Builds a mesh from flat buffers.
    ///
    /// `positions` holds 3 floats per vertex, `indices` 3 vertex indices per triangle.
    pub fn from_buffers(positions: &[f64], indices: Option<&[usize]>) -> Result<Self> {
        if !positions.len().is_multiple_of(3) {
            return Err(anyhow!(
                "Invalid position buffer length: {}",
                positions.len()
            ));
        }
        let vertices: Vec<Point> = positions
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect();

        let faces = match indices {
            Some(idx) => {
                if !idx.len().is_multiple_of(3) {
                    return Err(anyhow!("Invalid index buffer length: {}", idx.len()));
                }
                Some(
                    idx.chunks_exact(3)
                        .map(|c| TriangleIndex(c[0], c[1], c[2]))
                        .collect(),
                )
            }
            None => None,
        };

        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn faces(&self) -> Option<&[TriangleIndex]> {
        self.faces.as_deref()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.as_ref().map_or(0, |f| f.len())
    }

    /// Returns the three corner points of a face, or `None` if an index is out of range.
    pub fn triangle_points(&self, face: &TriangleIndex) -> Option<(Point, Point, Point)> {
        Some((
            *self.vertices.get(face.0)?,
            *self.vertices.get(face.1)?,
            *self.vertices.get(face.2)?,
        ))
    }

    /// Centroid, area and normal of a face. `None` for degenerate faces.
    pub fn face_geometry(&self, face: &TriangleIndex) -> Option<FaceGeometry> {
        let (p0, p1, p2) = self.triangle_points(face)?;
        FaceGeometry::new(p0, p1, p2)
    }

    /// Bounding box of all vertices.
    pub fn bbox(&self) -> Option<(Point, Point)> {
        bounding_box(&self.vertices)
    }

    pub fn translate(&mut self, vec: &Vector) {
        for pt in self.vertices.iter_mut() {
            *pt = *pt + *vec;
        }
    }

    /// Converts Z-up coordinates to the Y-up convention: (x, y, z) -> (x, z, -y).
    pub fn z_up_to_y_up(&mut self) {
        for pt in self.vertices.iter_mut() {
            *pt = Point::new(pt.x, pt.z, -pt.y);
        }
    }

    /// Flattens vertices into a position buffer (3 floats per vertex).
    pub fn position_buffer(&self) -> Vec<f64> {
        self.vertices.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Flattens faces into an index buffer (3 indices per triangle).
    pub fn index_buffer(&self) -> Option<Vec<usize>> {
        self.faces
            .as_ref()
            .map(|f| f.iter().flat_map(|t| t.as_array()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buffers() -> Result<()> {
        let positions = [0., 0., 0., 1., 0., 0., 0., 0., 1.];
        let mesh = Mesh::from_buffers(&positions, Some(&[0, 2, 1]))?;
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.faces().unwrap()[0], TriangleIndex(0, 2, 1));
        assert_eq!(mesh.position_buffer(), positions.to_vec());
        assert_eq!(mesh.index_buffer(), Some(vec![0, 2, 1]));

        let unindexed = Mesh::from_buffers(&positions, None)?;
        assert!(unindexed.faces().is_none());
        assert_eq!(unindexed.num_faces(), 0);
        Ok(())
    }

    #[test]
    fn test_from_buffers_invalid() {
        assert!(Mesh::from_buffers(&[0., 0.], None).is_err());
        assert!(Mesh::from_buffers(&[0., 0., 0.], Some(&[0, 0])).is_err());
    }

    #[test]
    fn test_triangle_points_out_of_range() {
        let mesh = Mesh::new(vec![Point::new(0., 0., 0.)], Some(vec![TriangleIndex(0, 1, 2)]));
        assert!(mesh.triangle_points(&TriangleIndex(0, 1, 2)).is_none());
        assert!(mesh.face_geometry(&TriangleIndex(0, 1, 2)).is_none());
    }

    #[test]
    fn test_z_up_to_y_up() {
        let mut mesh = Mesh::new(vec![Point::new(1., 2., 3.)], None);
        mesh.z_up_to_y_up();
        assert!(mesh.vertices()[0].is_close(&Point::new(1., 3., -2.)));
    }

    #[test]
    fn test_translate_and_bbox() {
        let mut mesh = Mesh::new(
            vec![Point::new(0., 0., 0.), Point::new(1., 2., 3.)],
            None,
        );
        mesh.translate(&Vector::new(1., 1., 1.));
        let (pmin, pmax) = mesh.bbox().unwrap();
        assert!(pmin.is_close(&Point::new(1., 1., 1.)));
        assert!(pmax.is_close(&Point::new(2., 3., 4.)));
    }
}
