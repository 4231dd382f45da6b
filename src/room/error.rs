//! Decode errors
//!
//! Every error aborts the whole room; no partial model is returned.

use std::fmt;

/// Error type for room decoding
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Header is not `WSM`
    BadMagic { found: [u8; 3] },
    /// Format revision newer than the decoder knows
    UnsupportedVersion(u16),
    /// Stream ended while reading `field`
    TruncatedInput { offset: usize, field: &'static str },
    /// Variant tag outside 0..=4
    UnknownVariantTag { tag: u8, offset: usize },
    /// Table entry whose value is nil
    IllegalNilValue { offset: usize },
    /// Tables nested deeper than `limits::MAX_TABLE_DEPTH`
    MalformedTable { depth: usize, offset: usize },
    /// Negative element count
    NegativeCount { field: &'static str, count: i32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadMagic { found } => {
                write!(f, "bad header: expected \"WSM\", found {:?}", String::from_utf8_lossy(found))
            }
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported format version {}", v),
            DecodeError::TruncatedInput { offset, field } => {
                write!(f, "unexpected end of input at byte {} while reading {}", offset, field)
            }
            DecodeError::UnknownVariantTag { tag, offset } => {
                write!(f, "unknown variant type {} at byte {}", tag, offset)
            }
            DecodeError::IllegalNilValue { offset } => {
                write!(f, "illegal nil value in entity data at byte {}", offset)
            }
            DecodeError::MalformedTable { depth, offset } => {
                write!(f, "entity data nested too deeply ({} levels) at byte {}", depth, offset)
            }
            DecodeError::NegativeCount { field, count } => {
                write!(f, "negative {} ({})", field, count)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
