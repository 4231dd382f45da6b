//! Brush-based `.map` writer
//!
//! Each room brush becomes a convex solid made of one plane per polygon edge
//! plus a top and a bottom cap. Planes are given as three points; their order
//! fixes the plane normal, so it must not change.
//!
//! Room x is mirrored (`-x`) to match the map coordinate convention.

use std::io::{self, Write};

use log::debug;

use super::config::ExportConfig;
use crate::room::variant::Variant;
use crate::room::{Brush, Entity, RoomData, Vec2};

/// Entity types the target game understands
pub const ACCEPTED_TYPES: &[&str] = &["worldspawn", "light"];

const WORLDSPAWN: &str = "worldspawn";
/// Fixed elevation of point entities
const ENTITY_ORIGIN_Z: f32 = 64.0;
/// Thickness given to flat brushes so they stay solid
const FLAT_BRUSH_THICKNESS: f32 = 32.0;
/// Texture for brushes whose material cannot be resolved
const EMPTY_TEXTURE: &str = "__TB_empty";

type Point = [f32; 3];

/// Write `room` as map text into `out`
pub fn export<W: Write>(room: &RoomData, config: &ExportConfig, out: &mut W) -> io::Result<()> {
    MapWriter {
        room,
        config,
        out,
        entity_count: 0,
    }
    .write()
}

struct MapWriter<'a, W: Write> {
    room: &'a RoomData,
    config: &'a ExportConfig,
    out: &'a mut W,
    entity_count: usize,
}

impl<W: Write> MapWriter<'_, W> {
    fn write(mut self) -> io::Result<()> {
        writeln!(self.out, "// Game: {}", self.config.game_name)?;
        writeln!(self.out, "// Format: Standard")?;

        self.write_entity(None)?;
        for index in 0..self.room.entities.len() {
            self.write_entity(Some(index))?;
        }
        Ok(())
    }

    /// `None` is the synthetic worldspawn
    fn write_entity(&mut self, index: Option<usize>) -> io::Result<()> {
        let room = self.room;
        let entity = index.map(|i| &room.entities[i]);
        let class = entity.map_or(WORLDSPAWN, |e| e.entity_type.as_str());

        if !ACCEPTED_TYPES.contains(&class) {
            debug!(
                "skipping entity #{} \"{}\" of unsupported type {}",
                index.unwrap_or_default(),
                entity.map_or("", |e| e.name.as_str()),
                class
            );
            return Ok(());
        }

        writeln!(self.out, "// entity {}", self.entity_count)?;
        self.entity_count += 1;
        writeln!(self.out, "{{")?;
        write_property(self.out, "classname", class)?;
        if let Some(entity) = entity {
            self.write_entity_properties(entity)?;
        }
        self.write_brushes(index)?;
        writeln!(self.out, "}}")
    }

    fn write_entity_properties(&mut self, entity: &Entity) -> io::Result<()> {
        let origin = format!("{} {} {}", -entity.position.x, entity.position.y, ENTITY_ORIGIN_Z);
        write_property(self.out, "origin", &origin)?;

        // A bool radius carries no distance
        let radius = entity
            .data
            .get_str("radius")
            .filter(|v| !matches!(v, Variant::Bool(_)))
            .and_then(|v| v.to_property_string());
        if let Some(radius) = radius {
            write_property(self.out, "light", &radius)?;
        }

        let channel = |key: &str| entity.data.get_str(key).and_then(|v| v.as_number());
        if let (Some(r), Some(g), Some(b)) = (channel("color_r"), channel("color_g"), channel("color_b")) {
            let color = format!("{} {} {}", to_byte_channel(r), to_byte_channel(g), to_byte_channel(b));
            write_property(self.out, "_color", &color)?;
        }

        if self.config.emit_entity_data && !entity.data.is_empty() {
            for (key, value) in entity.data.iter() {
                if let (Some(key), Some(value)) = (key.to_key_string(), value.to_property_string()) {
                    write_property(self.out, &format!("wsm_{}", key), &value)?;
                }
            }
        }
        Ok(())
    }

    fn write_brushes(&mut self, owner: Option<usize>) -> io::Result<()> {
        let room = self.room;
        let mut brush_count = 0;
        for brush in room.brushes.iter().filter(|b| b.owner() == owner) {
            if !brush.has_geometry() {
                continue;
            }
            if !brush.layer.is_known() {
                debug!("skipping brush on unknown layer {}", brush.layer.index());
                continue;
            }
            writeln!(self.out, "// brush {}", brush_count)?;
            brush_count += 1;
            self.write_brush(brush)?;
        }
        Ok(())
    }

    fn write_brush(&mut self, brush: &Brush) -> io::Result<()> {
        let floor_z = brush.vertical_position + brush.height;
        let mut ceil_z = brush.vertical_position;
        if floor_z == ceil_z {
            ceil_z = floor_z - FLAT_BRUSH_THICKNESS;
        }

        let texture = match self.room.material_name(brush) {
            Some(material) => self.config.resolve_texture(material),
            None => match self.config.resolve_texture("") {
                "" => EMPTY_TEXTURE,
                texture => texture,
            },
        };

        writeln!(self.out, "{{")?;
        for (v0, v1) in edges(&brush.vertices) {
            let plane = [
                [-v0.x, v0.y, ceil_z],
                [-v1.x, v1.y, ceil_z],
                [-v0.x, v0.y, ceil_z + 1.0],
            ];
            write_plane(self.out, &plane, texture)?;
        }
        write_plane(self.out, &[[0.0, 0.0, ceil_z], [1.0, 0.0, ceil_z], [0.0, 1.0, ceil_z]], texture)?;
        write_plane(self.out, &[[0.0, 0.0, floor_z], [0.0, 1.0, floor_z], [1.0, 0.0, floor_z]], texture)?;
        writeln!(self.out, "}}")
    }
}

/// Polygon edges including the closing edge from last to first vertex
fn edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

/// 0..1 color channel to 0..255, truncated
fn to_byte_channel(value: f64) -> i32 {
    (value * 255.0) as i32
}

fn write_property<W: Write>(out: &mut W, key: &str, value: &str) -> io::Result<()> {
    writeln!(out, "\"{}\" \"{}\"", key, value)
}

fn write_plane<W: Write>(out: &mut W, points: &[Point; 3], texture: &str) -> io::Result<()> {
    for p in points {
        write!(out, "( {} {} {} ) ", p[0], p[1], p[2])?;
    }
    writeln!(out, "{} 0 0 0 1 1", texture)
}
