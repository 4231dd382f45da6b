//! Test-only encoder for building room files byte by byte

use super::variant::{Table, Variant, TAG_BOOL, TAG_NIL, TAG_NUMBER, TAG_TABLE, TAG_TEXT};

pub fn encode_variant(value: &Variant) -> Vec<u8> {
    let mut buf = Vec::new();
    write_variant(&mut buf, value);
    buf
}

pub fn encode_table(table: &Table) -> Vec<u8> {
    let mut buf = Vec::new();
    write_table(&mut buf, table);
    buf
}

fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn write_variant(buf: &mut Vec<u8>, value: &Variant) {
    match value {
        Variant::Nil => buf.push(TAG_NIL),
        Variant::Number(n) => {
            buf.push(TAG_NUMBER);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Variant::Text(s) => {
            buf.push(TAG_TEXT);
            write_cstring(buf, s);
        }
        Variant::Bool(b) => {
            buf.push(TAG_BOOL);
            buf.push(*b as u8);
        }
        Variant::Table(t) => {
            buf.push(TAG_TABLE);
            write_table(buf, t);
        }
    }
}

fn write_table(buf: &mut Vec<u8>, table: &Table) {
    for (k, v) in table.iter() {
        write_variant(buf, k);
        write_variant(buf, v);
    }
    buf.push(TAG_NIL);
}

/// One polygon brush record
#[derive(Debug, Clone)]
pub struct BrushRecord {
    pub vertices: Vec<(f32, f32)>,
    /// Stored material reference (index + 1, 0 = none)
    pub material: u16,
    pub layer: u8,
    pub entity: u16,
    /// Only written for revision 7
    pub z: f32,
    pub height: f32,
    /// offset x, offset y, angle, scale x, scale y
    pub texture: [f32; 5],
}

impl Default for BrushRecord {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            material: 0,
            layer: 0,
            entity: 0,
            z: 0.0,
            height: 0.0,
            texture: [0.0, 0.0, 0.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub entity_type: String,
    pub name: String,
    pub position: (f32, f32),
    pub angle: f32,
    pub data: Table,
}

enum BrushEntry {
    Polygon(BrushRecord),
    Circle,
}

/// Builds a `.wsm` byte stream for a given format revision
pub struct RoomBuilder {
    revision: u16,
    materials: Vec<String>,
    default_wall_height: f32,
    brushes: Vec<BrushEntry>,
    entities: Vec<EntityRecord>,
}

impl RoomBuilder {
    pub fn new(revision: u16) -> Self {
        Self {
            revision,
            materials: Vec::new(),
            default_wall_height: 0.0,
            brushes: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn material(mut self, name: &str) -> Self {
        self.materials.push(name.to_string());
        self
    }

    pub fn default_wall_height(mut self, height: f32) -> Self {
        self.default_wall_height = height;
        self
    }

    pub fn brush(mut self, brush: BrushRecord) -> Self {
        self.brushes.push(BrushEntry::Polygon(brush));
        self
    }

    pub fn circle_brush(mut self) -> Self {
        self.brushes.push(BrushEntry::Circle);
        self
    }

    pub fn entity(mut self, entity: EntityRecord) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"WSM");
        buf.extend_from_slice(&self.revision.to_le_bytes());
        for _ in 0..3 {
            buf.extend_from_slice(&0u16.to_le_bytes());
        }

        for name in &self.materials {
            write_cstring(&mut buf, name);
        }
        buf.push(0);

        if self.revision > 3 {
            buf.extend_from_slice(&self.default_wall_height.to_le_bytes());
        }

        buf.extend_from_slice(&(self.brushes.len() as i32).to_le_bytes());
        for entry in &self.brushes {
            match entry {
                BrushEntry::Circle => {
                    buf.push(0xFF);
                    buf.extend_from_slice(&[0xAB; 12]);
                }
                BrushEntry::Polygon(b) => self.write_brush(&mut buf, b),
            }
        }

        buf.extend_from_slice(&(self.entities.len() as i32).to_le_bytes());
        for e in &self.entities {
            write_cstring(&mut buf, &e.entity_type);
            buf.extend_from_slice(&e.position.0.to_le_bytes());
            buf.extend_from_slice(&e.position.1.to_le_bytes());
            buf.extend_from_slice(&e.angle.to_le_bytes());
            write_cstring(&mut buf, &e.name);
            write_table(&mut buf, &e.data);
        }

        buf
    }

    fn write_brush(&self, buf: &mut Vec<u8>, b: &BrushRecord) {
        buf.push(b.vertices.len() as u8);
        for (x, y) in &b.vertices {
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
        }
        buf.extend_from_slice(&b.material.to_le_bytes());
        for f in b.texture {
            buf.extend_from_slice(&f.to_le_bytes());
        }
        buf.push(b.layer);
        buf.extend_from_slice(&b.entity.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // reserved

        // Fake 2D height / base / z offset, junk values the decoder must skip
        let fake_fields = match self.revision {
            0..=3 => 0,
            4 => 1,
            5 => 2,
            _ => 3,
        };
        for _ in 0..fake_fields {
            buf.extend_from_slice(&999.0f32.to_le_bytes());
        }

        if self.revision > 6 {
            buf.extend_from_slice(&b.z.to_le_bytes());
            buf.extend_from_slice(&b.height.to_le_bytes());
        }
    }
}
