//! dotbim (.bim) scene I/O.
//!
//! dotbim is a minimalist JSON format with triangulated meshes and elements
//! referencing them. See: https://dotbim.net/
//!
//! dotbim models are Z-up; pass `z_up = true` to convert to the Y-up scene
//! convention on load and back on export.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::scene::{BUILDING_TAG, Building, DEFAULT_BUILDING_COLOR, Scene, SceneObject};
use crate::sim::color::{Rgb, to_rgba8};
use crate::{Mesh, Point, Vector};

const SCHEMA_VERSION: &str = "1.0.0";

/// Root structure of a dotbim file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimFile {
    pub schema_version: String,
    pub meshes: Vec<BimMesh>,
    pub elements: Vec<BimElement>,
    #[serde(default)]
    pub info: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimMesh {
    pub mesh_id: usize,
    /// Flat array of coordinates: [x0, y0, z0, x1, y1, z1, ...]
    pub coordinates: Vec<f64>,
    /// Flat array of triangle indices: [f0_v0, f0_v1, f0_v2, f1_v0, ...]
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BimElement {
    pub mesh_id: usize,
    /// Element type (e.g. "Building", "Tree", "Ground")
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub color: BimColor,
    #[serde(default)]
    pub vector: BimVector,
    #[serde(default)]
    pub rotation: BimRotation,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub info: HashMap<String, String>,
    /// Per-triangle RGBA, flattened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_colors: Option<Vec<u8>>,
}

/// RGBA color with components in 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BimColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Element translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BimVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Element rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BimRotation {
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
}

impl Default for BimColor {
    fn default() -> Self {
        Self::from_rgb(DEFAULT_BUILDING_COLOR)
    }
}

impl BimColor {
    pub fn from_rgb(c: Rgb) -> Self {
        let [r, g, b, a] = to_rgba8(c);
        Self { r, g, b, a }
    }

    pub fn to_rgb(self) -> Rgb {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

impl Default for BimRotation {
    fn default() -> Self {
        Self {
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
            qw: 1.0,
        }
    }
}

impl BimRotation {
    fn is_identity(&self) -> bool {
        self.qx == 0.0 && self.qy == 0.0 && self.qz == 0.0
    }

    /// Rotates `p` by the (normalized) quaternion.
    fn rotate(&self, p: Point) -> Point {
        let n = (self.qx * self.qx + self.qy * self.qy + self.qz * self.qz + self.qw * self.qw)
            .sqrt();
        if n == 0.0 || !n.is_finite() {
            return p;
        }
        let u = Vector::new(self.qx / n, self.qy / n, self.qz / n);
        let w = self.qw / n;
        let v = Vector::from_a_point(p);
        // v' = v + 2w(u x v) + 2u x (u x v)
        let t = u.cross(&v) * 2.0;
        let r = v + t * w + u.cross(&t);
        Point::new(r.dx, r.dy, r.dz)
    }
}

/// Reads a dotbim file.
pub fn read_bim(path: &Path) -> Result<BimFile> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let bim_file: BimFile = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse BIM file: {}", path.display()))?;

    Ok(bim_file)
}

/// Writes a dotbim file.
pub fn write_bim(path: &Path, bim_file: &BimFile) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, bim_file)
        .with_context(|| format!("Failed to write BIM file: {}", path.display()))?;

    Ok(())
}

/// Reads a dotbim file as a scene plus its selectable buildings.
pub fn load_scene(path: &Path, z_up: bool) -> Result<(Scene, Vec<Building>)> {
    let bim_file = read_bim(path)?;
    bim_to_scene(&bim_file, z_up)
}

/// Converts dotbim elements to scene objects.
///
/// The object name comes from `info["name"]` (fallback `element_<mesh_id>`),
/// the tag from `info["tag"]` or the lower-cased element type. Elements tagged
/// `"building"` become buildings carrying the element color.
pub fn bim_to_scene(bim_file: &BimFile, z_up: bool) -> Result<(Scene, Vec<Building>)> {
    let meshes: HashMap<usize, &BimMesh> =
        bim_file.meshes.iter().map(|m| (m.mesh_id, m)).collect();

    let mut objects = Vec::with_capacity(bim_file.elements.len());
    let mut buildings = Vec::new();

    for element in &bim_file.elements {
        let bim_mesh = meshes
            .get(&element.mesh_id)
            .ok_or_else(|| anyhow!("Mesh {} not found for element", element.mesh_id))?;
        let mesh = element_mesh(bim_mesh, element, z_up)?;

        let name = element
            .info
            .get("name")
            .cloned()
            .unwrap_or_else(|| format!("element_{}", element.mesh_id));
        let tag = element
            .info
            .get("tag")
            .cloned()
            .unwrap_or_else(|| element.element_type.to_lowercase());

        if tag == BUILDING_TAG {
            if buildings.iter().any(|b: &Building| b.name == name) {
                warn!("Duplicate building name '{name}'; only the first can be selected");
            }
            buildings.push(Building::new(&name, objects.len(), element.color.to_rgb()));
        }
        debug!("Loaded '{}' ({}) with {} faces", name, tag, mesh.num_faces());
        objects.push(SceneObject::new(&name, &tag, mesh));
    }

    Ok((Scene::new(objects), buildings))
}

fn element_mesh(bim_mesh: &BimMesh, element: &BimElement, z_up: bool) -> Result<Mesh> {
    let mut mesh = Mesh::from_buffers(&bim_mesh.coordinates, Some(&bim_mesh.indices))
        .with_context(|| format!("Invalid mesh {}", bim_mesh.mesh_id))?;

    if !element.rotation.is_identity() {
        for p in mesh.vertices.iter_mut() {
            *p = element.rotation.rotate(*p);
        }
    }
    let t = element.vector;
    mesh.translate(&Vector::new(t.x, t.y, t.z));
    if z_up {
        mesh.z_up_to_y_up();
    }
    Ok(mesh)
}

/// Converts a scene back to dotbim, with per-face colors of highlighted buildings.
pub fn scene_to_bim(scene: &Scene, buildings: &[Building], z_up: bool) -> Result<BimFile> {
    let mut meshes = Vec::with_capacity(scene.objects().len());
    let mut elements = Vec::with_capacity(scene.objects().len());

    for (mesh_id, object) in scene.objects().iter().enumerate() {
        let building = buildings.iter().find(|b| b.object_index == mesh_id);

        let mut coordinates = object.mesh.position_buffer();
        if z_up {
            // (x, y, z) -> (x, -z, y), inverse of the import conversion
            for c in coordinates.chunks_exact_mut(3) {
                let (y, z) = (c[1], c[2]);
                c[1] = -z;
                c[2] = y;
            }
        }
        let indices = object
            .mesh
            .index_buffer()
            .ok_or_else(|| anyhow!("Scene object '{}' has no faces", object.name))?;

        let color = building.map_or(DEFAULT_BUILDING_COLOR, |b| b.original_color());
        let face_colors = building
            .and_then(|b| b.face_colors.as_ref())
            .map(|colors| {
                colors
                    .chunks(3)
                    .flat_map(|vertex_colors| to_rgba8(vertex_colors[0]))
                    .collect()
            });

        let mut info = HashMap::new();
        info.insert("name".to_string(), object.name.clone());
        info.insert("tag".to_string(), object.tag.clone());

        meshes.push(BimMesh {
            mesh_id,
            coordinates,
            indices,
        });
        elements.push(BimElement {
            mesh_id,
            element_type: element_type(&object.tag),
            color: BimColor::from_rgb(color),
            vector: BimVector::default(),
            rotation: BimRotation::default(),
            guid: Uuid::new_v4().to_string(),
            info,
            face_colors,
        });
    }

    let mut info = HashMap::new();
    info.insert("exported_by".to_string(), "solar3d".to_string());

    Ok(BimFile {
        schema_version: SCHEMA_VERSION.to_string(),
        meshes,
        elements,
        info,
    })
}

/// "building" -> "Building"
fn element_type(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Element".to_string(),
    }
}
