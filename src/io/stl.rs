//! STL mesh reader.
//!
//! STL stores unconnected triangles. Vertices are de-duplicated on load so
//! the resulting mesh is indexed and can be analysed per face.

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::Path;

use crate::scene::{BUILDING_TAG, Scene, SceneObject};
use crate::{Mesh, Point, TriangleIndex};

const HEADER_LEN: usize = 80;
const BINARY_TRIANGLE_LEN: usize = 50;

/// Vertices closer than 1/DEDUP_SCALE on every axis are merged.
const DEDUP_SCALE: f64 = 1e9;

/// STL file format variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

/// Reads an ASCII or binary STL file into an indexed mesh.
pub fn read_stl(path: &Path) -> Result<Mesh> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_stl(&bytes).with_context(|| format!("Failed to parse STL file: {}", path.display()))
}

/// Reads an STL file as a scene holding a single building named `name`.
pub fn read_stl_scene(path: &Path, name: &str, z_up: bool) -> Result<Scene> {
    let mut mesh = read_stl(path)?;
    if z_up {
        mesh.z_up_to_y_up();
    }
    Ok(Scene::new(vec![SceneObject::new(name, BUILDING_TAG, mesh)]))
}

/// Parses STL data held in memory.
pub fn parse_stl(bytes: &[u8]) -> Result<Mesh> {
    match detect_format(bytes) {
        StlFormat::Binary => parse_binary(bytes),
        StlFormat::Ascii => {
            let text = std::str::from_utf8(bytes).context("ASCII STL is not valid UTF-8")?;
            parse_ascii(text)
        }
    }
}

/// Binary files may also start with "solid", so the size formula wins.
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    if bytes.len() >= HEADER_LEN + 4 {
        let count = u32::from_le_bytes([
            bytes[HEADER_LEN],
            bytes[HEADER_LEN + 1],
            bytes[HEADER_LEN + 2],
            bytes[HEADER_LEN + 3],
        ]) as usize;
        let expected = count
            .checked_mul(BINARY_TRIANGLE_LEN)
            .and_then(|n| n.checked_add(HEADER_LEN + 4));
        if expected == Some(bytes.len()) {
            return StlFormat::Binary;
        }
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_LEN)]);
    if head.trim_start().starts_with("solid") {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Point>,
    faces: Vec<TriangleIndex>,
    index: HashMap<(i64, i64, i64), usize>,
}

impl MeshBuilder {
    fn vertex(&mut self, p: Point) -> usize {
        let key = (
            (p.x * DEDUP_SCALE).round() as i64,
            (p.y * DEDUP_SCALE).round() as i64,
            (p.z * DEDUP_SCALE).round() as i64,
        );
        *self.index.entry(key).or_insert_with(|| {
            self.vertices.push(p);
            self.vertices.len() - 1
        })
    }

    fn triangle(&mut self, p0: Point, p1: Point, p2: Point) {
        let face = TriangleIndex(self.vertex(p0), self.vertex(p1), self.vertex(p2));
        self.faces.push(face);
    }

    fn build(self) -> Mesh {
        Mesh::new(self.vertices, Some(self.faces))
    }
}

fn parse_ascii(text: &str) -> Result<Mesh> {
    let mut builder = MeshBuilder::default();
    let mut corners: Vec<Point> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let mut coord = || -> Result<f64> {
                    let s = parts
                        .next()
                        .ok_or_else(|| anyhow!("Missing coordinate on line {}", line_no + 1))?;
                    s.parse()
                        .with_context(|| {
                            format!("Invalid coordinate '{s}' on line {}", line_no + 1)
                        })
                };
                let p = Point::new(coord()?, coord()?, coord()?);
                corners.push(p);
            }
            Some("endloop") => {
                if let [p0, p1, p2] = corners[..] {
                    builder.triangle(p0, p1, p2);
                } else {
                    return Err(anyhow!(
                        "Facet ending on line {} has {} vertices",
                        line_no + 1,
                        corners.len()
                    ));
                }
                corners.clear();
            }
            _ => {}
        }
    }

    Ok(builder.build())
}

fn parse_binary(bytes: &[u8]) -> Result<Mesh> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(anyhow!("Binary STL is too short: {} bytes", bytes.len()));
    }
    let count = read_u32(bytes, HEADER_LEN) as usize;
    let body = &bytes[HEADER_LEN + 4..];
    if body.len() < count * BINARY_TRIANGLE_LEN {
        return Err(anyhow!(
            "Binary STL declares {count} triangles but holds {} bytes of data",
            body.len()
        ));
    }

    let mut builder = MeshBuilder::default();
    for record in body.chunks_exact(BINARY_TRIANGLE_LEN).take(count) {
        // Skip the stored normal (12 bytes); it is recomputed from the winding
        let p0 = read_point(record, 12);
        let p1 = read_point(record, 24);
        let p2 = read_point(record, 36);
        builder.triangle(p0, p1, p2);
    }

    Ok(builder.build())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_point(record: &[u8], at: usize) -> Point {
    let f = |i: usize| f32::from_bits(read_u32(record, at + 4 * i)) as f64;
    Point::new(f(0), f(1), f(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SQUARE_ASCII: &str = "solid roof
  facet normal 0 1 0
    outer loop
      vertex 0 0 0
      vertex 1 0 1
      vertex 1 0 0
    endloop
  endfacet
  facet normal 0 1 0
    outer loop
      vertex 0 0 0
      vertex 0 0 1
      vertex 1 0 1
    endloop
  endfacet
endsolid roof
";

    fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        // Header deliberately starts with "solid"
        let mut bytes = b"solid but binary".to_vec();
        bytes.resize(HEADER_LEN, 0);
        bytes.extend((triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            bytes.extend([0u8; 12]);
            for v in tri {
                for c in v {
                    bytes.extend(c.to_le_bytes());
                }
            }
            bytes.extend([0u8; 2]);
        }
        bytes
    }

    #[test]
    fn test_parse_ascii() -> Result<()> {
        let mesh = parse_stl(SQUARE_ASCII.as_bytes())?;
        assert_eq!(mesh.num_faces(), 2);
        // Shared corners are merged
        assert_eq!(mesh.vertices().len(), 4);
        let geom = mesh.face_geometry(&mesh.faces().unwrap()[0]).unwrap();
        assert!((geom.normal.dy - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_parse_binary() -> Result<()> {
        let bytes = binary_stl(&[
            [[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]],
            [[1., 0., 0.], [1., 1., 0.], [0., 1., 0.]],
        ]);
        assert_eq!(detect_format(&bytes), StlFormat::Binary);
        let mesh = parse_stl(&bytes)?;
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces().unwrap()[1], TriangleIndex(1, 3, 2));
        Ok(())
    }

    #[test]
    fn test_truncated_input() {
        let mut bytes = binary_stl(&[[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]]]);
        bytes.truncate(bytes.len() - 10);
        bytes[0] = b'x';
        assert!(parse_stl(&bytes).is_err());

        let broken = "solid x\nouter loop\nvertex 0 0 0\nvertex 1 0\nendloop\n";
        assert!(parse_stl(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_read_stl_scene() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("roof.stl");
        std::fs::File::create(&path)?.write_all(SQUARE_ASCII.as_bytes())?;

        let scene = read_stl_scene(&path, "roof", false)?;
        assert_eq!(scene.objects().len(), 1);
        let (_, obj) = scene.find("roof").unwrap();
        assert!(obj.is_building());
        assert_eq!(obj.mesh.num_faces(), 2);

        assert!(read_stl(&dir.path().join("missing.stl")).is_err());
        Ok(())
    }
}
