use crate::sim::color::Rgb;
use crate::sim::result::PvAggregates;

/// Default display color of buildings.
pub const DEFAULT_BUILDING_COLOR: Rgb = [0.8, 0.8, 0.8];

/// Display state of a building's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// The material the building was loaded with.
    Original(Rgb),
    /// Per-vertex colors are shown instead of a flat color.
    Highlighted,
}

/// A selectable building backed by a scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub name: String,
    /// Index of the backing object in the scene.
    pub object_index: usize,
    pub material: Material,
    original_color: Rgb,
    /// Per-vertex colors (three per face) while highlighted.
    pub face_colors: Option<Vec<Rgb>>,
    /// Aggregates of the last PV estimate.
    pub summary: Option<PvAggregates>,
}

impl Building {
    pub fn new(name: &str, object_index: usize, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            object_index,
            material: Material::Original(color),
            original_color: color,
            face_colors: None,
            summary: None,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self.material, Material::Highlighted)
    }

    pub fn original_color(&self) -> Rgb {
        self.original_color
    }

    pub(crate) fn highlight(&mut self) {
        self.material = Material::Highlighted;
    }

    /// Restores the material the building was loaded with and drops face colors.
    pub(crate) fn revert(&mut self) {
        self.material = Material::Original(self.original_color);
        self.face_colors = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_and_revert() {
        let mut b = Building::new("b1", 0, [0.1, 0.2, 0.3]);
        assert!(!b.is_highlighted());
        b.highlight();
        b.face_colors = Some(vec![[1.0, 0.0, 0.0]; 3]);
        assert!(b.is_highlighted());
        b.revert();
        assert_eq!(b.material, Material::Original([0.1, 0.2, 0.3]));
        assert!(b.face_colors.is_none());
    }
}
