//! Self-describing variant values used for entity property data
//!
//! Wire format, one tag byte followed by the payload:
//! - `0` nil
//! - `1` number, f64 little-endian
//! - `2` text, null-terminated
//! - `3` table, key/value pairs terminated by a nil key
//! - `4` bool, one byte, nonzero = true

use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::limits;
use super::reader::ByteReader;

pub const TAG_NIL: u8 = 0;
pub const TAG_NUMBER: u8 = 1;
pub const TAG_TEXT: u8 = 2;
pub const TAG_TABLE: u8 = 3;
pub const TAG_BOOL: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Nil,
    Number(f64),
    Text(String),
    Bool(bool),
    Table(Table),
}

impl Variant {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Variant::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Variant::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used for map property values.
    /// Tables and nil have no scalar form.
    pub fn to_property_string(&self) -> Option<String> {
        match self {
            Variant::Number(n) => Some(n.to_string()),
            Variant::Text(s) => Some(s.clone()),
            Variant::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Variant::Nil | Variant::Table(_) => None,
        }
    }

    /// Text form used for map property keys. Only text and number keys qualify.
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            Variant::Number(n) => Some(n.to_string()),
            Variant::Text(s) => Some(s.clone()),
            Variant::Bool(_) | Variant::Nil | Variant::Table(_) => None,
        }
    }
}

/// Ordered key/value map with last-write-wins on duplicate keys.
///
/// Keys are compared structurally, so a `Vec` keeps insertion order without
/// needing `Hash`/`Eq` on floating point keys. Tables are small.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    entries: Vec<(Variant, Variant)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: Variant, value: Variant) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Lookup by text key, the common case for entity properties
    pub fn get_str(&self, key: &str) -> Option<&Variant> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variant, &Variant)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Variant, Variant)> for Table {
    fn from_iter<I: IntoIterator<Item = (Variant, Variant)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Decode one variant. `depth` is the nesting level of the enclosing table.
pub fn read_variant(r: &mut ByteReader, depth: usize) -> Result<Variant, DecodeError> {
    let offset = r.offset();
    let tag = r.read_u8("variant tag")?;
    let value = match tag {
        TAG_NIL => Variant::Nil,
        TAG_NUMBER => Variant::Number(r.read_f64("variant number")?),
        TAG_TEXT => Variant::Text(r.read_cstring("variant text")?),
        TAG_TABLE => Variant::Table(read_table_at(r, depth + 1)?),
        TAG_BOOL => Variant::Bool(r.read_u8("variant bool")? != 0),
        tag => return Err(DecodeError::UnknownVariantTag { tag, offset }),
    };
    Ok(value)
}

/// Decode a top-level table (entity data)
pub fn read_table(r: &mut ByteReader) -> Result<Table, DecodeError> {
    read_table_at(r, 1)
}

fn read_table_at(r: &mut ByteReader, depth: usize) -> Result<Table, DecodeError> {
    if depth > limits::MAX_TABLE_DEPTH {
        return Err(DecodeError::MalformedTable { depth, offset: r.offset() });
    }

    let mut table = Table::new();
    loop {
        let key = read_variant(r, depth)?;
        if key == Variant::Nil {
            break;
        }

        let value_offset = r.offset();
        let value = read_variant(r, depth)?;
        if value == Variant::Nil {
            return Err(DecodeError::IllegalNilValue { offset: value_offset });
        }

        table.insert(key, value);
    }
    Ok(table)
}
