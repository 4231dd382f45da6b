//! WS1 room files (`.wsm`)
//!
//! Binary rooms from the WS1 2D level editor: materials, extruded polygon
//! brushes, and point entities carrying variant property tables.

mod data;
pub mod decode;
mod error;
mod reader;
pub mod variant;

#[cfg(test)]
pub(crate) mod fixture;

pub use data::*;
pub use decode::{decode_with, DecodeParams};
pub use error::DecodeError;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum nesting of entity data tables
    pub const MAX_TABLE_DEPTH: usize = 64;
}
