//! WS1 room decoder
//!
//! Layout (all little-endian):
//! - `WSM` magic, then four u16 version words; word 0 is the format revision
//! - material names, null-terminated, ended by an empty name
//! - default wall height (f32, revision > 3)
//! - i32 brush count + brush records
//! - i32 entity count + entity records
//!
//! Later revisions only ever append fields to a brush record, so the record
//! is read as one sequence of "present if revision > k" fields.

use log::debug;

use super::data::{Brush, Entity, Layer, RoomData, TextureTransform, Vec2};
use super::error::DecodeError;
use super::reader::ByteReader;
use super::variant::read_table;

pub const MAGIC: &[u8; 3] = b"WSM";

/// Highest format revision this decoder understands
pub const MAX_FORMAT_REVISION: u16 = 7;

/// Point count marking a circle brush
const CIRCLE_MARKER: u8 = 0xFF;
/// Opaque circle payload that follows the marker
const CIRCLE_PAYLOAD_LEN: usize = 12;

/// Legacy wall heights are multiples of the room's default wall height
const WALL_HEIGHT_SCALE: f32 = 8.0;
const CEILING_HEIGHT_SCALE: f32 = 32.0;
/// Heights used when a wall or ceiling ends up with zero height
const MIN_WALL_HEIGHT: f32 = 32.0;
const MIN_CEILING_HEIGHT: f32 = 128.0;

/// Decoder options
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Reject files whose header is not `WSM`
    pub require_magic: bool,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self { require_magic: true }
    }
}

/// Which optional fields a given format revision carries
#[derive(Debug, Clone, Copy)]
struct Layout {
    revision: u16,
}

impl Layout {
    fn has_default_wall_height(self) -> bool {
        self.revision > 3
    }

    fn has_fake2d_height(self) -> bool {
        self.revision > 3
    }

    fn has_fake2d_base(self) -> bool {
        self.revision > 4
    }

    fn has_fake2d_z_offset(self) -> bool {
        self.revision > 5
    }

    /// Revision 7 (CRX3D) stores real brush z and height
    fn has_brush_z(self) -> bool {
        self.revision > 6
    }
}

/// Human readable name of a format revision
fn format_name(revision: u16) -> &'static str {
    match revision {
        5 => "PIC20",
        6 => "PIC20/CRX",
        7 => "CRX3D",
        _ => "Legacy",
    }
}

/// Decode a room with the default options
#[allow(dead_code)]
pub fn decode(bytes: &[u8]) -> Result<RoomData, DecodeError> {
    decode_with(bytes, &DecodeParams::default())
}

/// Decode a room. All-or-nothing: any error discards the partial model.
pub fn decode_with(bytes: &[u8], params: &DecodeParams) -> Result<RoomData, DecodeError> {
    let mut r = ByteReader::new(bytes);

    let magic: [u8; 3] = r.read_bytes("header")?;
    if params.require_magic && &magic != MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }

    let mut version = [0u16; 4];
    for word in &mut version {
        *word = r.read_u16("version")?;
    }
    let revision = version[0];
    debug!("[WS1 Room] version {}", revision);
    if revision > MAX_FORMAT_REVISION {
        return Err(DecodeError::UnsupportedVersion(revision));
    }
    debug!("[WS1 Room] format: {} ({})", format_name(revision), revision);
    let layout = Layout { revision };

    let materials = read_materials(&mut r)?;
    debug!("[WS1 Room] material count: {}", materials.len());

    let mut default_wall_height = 0.0;
    if layout.has_default_wall_height() {
        default_wall_height = r.read_f32("default wall height")?;
        debug!("[WS1 Room] default wall height: {}", default_wall_height);
    }

    let brush_count = read_count(&mut r, "brush count")?;
    debug!("[WS1 Room] brush count: {}", brush_count);
    let mut brushes = Vec::with_capacity(brush_count.min(r.remaining()));
    for i in 0..brush_count {
        brushes.push(read_brush(&mut r, layout, default_wall_height, i)?);
    }

    let entity_count = read_count(&mut r, "entity count")?;
    debug!("[WS1 Room] entity count: {}", entity_count);
    let mut entities = Vec::with_capacity(entity_count.min(r.remaining()));
    for _ in 0..entity_count {
        entities.push(read_entity(&mut r)?);
    }

    Ok(RoomData {
        materials,
        brushes,
        entities,
    })
}

fn read_count(r: &mut ByteReader, field: &'static str) -> Result<usize, DecodeError> {
    let count = r.read_i32(field)?;
    usize::try_from(count).map_err(|_| DecodeError::NegativeCount { field, count })
}

fn read_materials(r: &mut ByteReader) -> Result<Vec<String>, DecodeError> {
    let mut materials = Vec::new();
    loop {
        let name = r.read_cstring("material name")?;
        if name.is_empty() {
            return Ok(materials);
        }
        materials.push(name);
    }
}

fn read_vec2(r: &mut ByteReader, field: &'static str) -> Result<Vec2, DecodeError> {
    let x = r.read_f32(field)?;
    let y = r.read_f32(field)?;
    Ok(Vec2::new(x, y))
}

fn read_brush(
    r: &mut ByteReader,
    layout: Layout,
    default_wall_height: f32,
    index: usize,
) -> Result<Brush, DecodeError> {
    let mut brush = Brush::default();

    let point_count = r.read_u8("brush point count")?;
    if point_count == CIRCLE_MARKER {
        debug!("[WS1 Room] ignoring circle brush: #{}", index);
        r.skip(CIRCLE_PAYLOAD_LEN, "circle brush payload")?;
        return Ok(brush);
    }

    brush.vertices = (0..point_count)
        .map(|_| read_vec2(r, "brush vertex"))
        .collect::<Result<_, _>>()?;

    brush.material_index = i32::from(r.read_u16("brush material")?) - 1;

    brush.texture_transform = TextureTransform {
        offset: read_vec2(r, "texture offset")?,
        angle: r.read_f32("texture angle")?,
        scale: read_vec2(r, "texture scale")?,
    };

    brush.layer = Layer::from_index(r.read_u8("brush layer")?);
    brush.entity_index = i32::from(r.read_u16("brush entity")?);
    r.skip(2, "brush reserved")?;

    // Fake 2D fields only matter to the 2D editor preview
    if layout.has_fake2d_height() {
        r.skip(4, "brush fake 2D height")?;
    }
    if layout.has_fake2d_base() {
        r.skip(4, "brush fake 2D base")?;
    }
    if layout.has_fake2d_z_offset() {
        r.skip(4, "brush fake 2D z offset")?;
    }

    let (base, height) = if layout.has_brush_z() {
        let base = r.read_f32("brush z")?;
        let height = r.read_f32("brush height")?;
        (base, height)
    } else {
        (0.0, legacy_height(brush.layer, default_wall_height))
    };

    if brush.layer.is_known() {
        brush.vertical_position = base;
        brush.height = clamp_height(brush.layer, height);
    }

    Ok(brush)
}

/// Height of a brush in revisions without explicit z
fn legacy_height(layer: Layer, default_wall_height: f32) -> f32 {
    match layer {
        Layer::Wall => WALL_HEIGHT_SCALE * default_wall_height,
        Layer::Ceiling => CEILING_HEIGHT_SCALE * default_wall_height,
        _ => 0.0,
    }
}

fn clamp_height(layer: Layer, height: f32) -> f32 {
    match layer {
        Layer::Ceiling if height == 0.0 => MIN_CEILING_HEIGHT,
        Layer::Wall if height == 0.0 => MIN_WALL_HEIGHT,
        _ => height,
    }
}

fn read_entity(r: &mut ByteReader) -> Result<Entity, DecodeError> {
    let entity_type = r.read_cstring("entity type")?;
    let position = read_vec2(r, "entity position")?;
    let _angle = r.read_f32("entity angle")?;
    let name = r.read_cstring("entity name")?;
    let data = read_table(r)?;
    debug!("[WS1 Room] entity \"{}\" ({}): {} data entries", name, entity_type, data.len());

    Ok(Entity {
        entity_type,
        name,
        position,
        data,
    })
}
