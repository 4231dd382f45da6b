//! Room model produced by the decoder
//!
//! A room is three flat lists: materials, brushes and entities.
//! Brushes refer to materials and entities by index, never by reference.

use serde::{Deserialize, Serialize};

use super::variant::Table;

/// 2D point in editor units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Brush layer in the 2D editor
///
/// The stored byte is kept for out-of-range values so nothing is lost on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    #[default]
    Floor,
    LowWall,
    Wall,
    Ceiling,
    Unknown(u8),
}

impl Layer {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Layer::Floor,
            1 => Layer::LowWall,
            2 => Layer::Wall,
            3 => Layer::Ceiling,
            n => Layer::Unknown(n),
        }
    }

    /// Raw layer byte as stored in the file
    pub fn index(self) -> u8 {
        match self {
            Layer::Floor => 0,
            Layer::LowWall => 1,
            Layer::Wall => 2,
            Layer::Ceiling => 3,
            Layer::Unknown(n) => n,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Layer::Unknown(_))
    }
}

/// Editor texture transform, kept for debugging dumps only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub angle: f32,
    pub scale: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::default(),
            angle: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

/// Polygon extruded downwards from `vertical_position` by `height`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Polygon in winding order. Empty for shapes the decoder skips (circles).
    pub vertices: Vec<Vec2>,
    /// Top z
    pub vertical_position: f32,
    /// Downward extent
    pub height: f32,
    pub layer: Layer,
    /// Raw attachment: 0 = world, N = entity N-1
    pub entity_index: i32,
    /// Index into `RoomData::materials`, -1 when unresolved
    pub material_index: i32,
    pub texture_transform: TextureTransform,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            vertical_position: 0.0,
            height: 0.0,
            layer: Layer::Floor,
            entity_index: 0,
            material_index: -1,
            texture_transform: TextureTransform::default(),
        }
    }
}

impl Brush {
    /// Entity slot this brush belongs to; `None` means worldspawn.
    pub fn owner(&self) -> Option<usize> {
        match self.entity_index - 1 {
            -1 => None,
            i if i >= 0 => Some(i as usize),
            // Negative raw values cannot come out of the decoder (u16 on disk)
            _ => Some(usize::MAX),
        }
    }

    pub fn has_geometry(&self) -> bool {
        !self.vertices.is_empty()
    }
}

/// Point entity placed in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub name: String,
    pub position: Vec2,
    pub data: Table,
}

/// Decoded room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    pub materials: Vec<String>,
    pub brushes: Vec<Brush>,
    pub entities: Vec<Entity>,
}

impl RoomData {
    /// Material name for a brush, if its index resolves
    pub fn material_name(&self, brush: &Brush) -> Option<&str> {
        usize::try_from(brush.material_index)
            .ok()
            .and_then(|i| self.materials.get(i))
            .map(String::as_str)
    }
}
