//! Errors that occur while compiling a font

use std::path::PathBuf;

use thiserror::Error;
use write_fonts::tables::cmap::CmapConflict;

/// An error that aborts the build.
///
/// No artifact is written once one of these has been returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("layer '{layer}' has {actual} pixels, expected {expected}")]
    MalformedBitmap {
        layer: String,
        expected: usize,
        actual: usize,
    },

    #[error("glyph '{glyph}' has no pixel data to build a cartouche from")]
    MissingSourceGeometry { glyph: String },

    #[error("glyph '{glyph}' ({width}x{height} at {offset_x},{offset_y}) does not fit in the cartouche frame")]
    CartoucheOverflow {
        glyph: String,
        width: u32,
        height: u32,
        offset_x: i32,
        offset_y: i32,
    },

    #[error("glyph '{glyph}' references unknown glyph key '{key}'")]
    UnresolvedSubstitutionKey { glyph: String, key: String },

    #[error("index {index} is claimed by both '{first}' and '{second}'")]
    DuplicateIndex {
        index: u32,
        first: String,
        second: String,
    },

    #[error("glyph '{glyph}' claims index 0, which is reserved for .notdef")]
    ReservedIndex { glyph: String },

    #[error("glyph '{glyph}' has index {index}, which does not fit in a glyph id")]
    IndexOutOfRange { glyph: String, index: u32 },

    #[error("glyph '{glyph}' has invalid code point {value:#06X}")]
    InvalidCodePoint { glyph: String, value: u32 },

    #[error(transparent)]
    CodePointConflict(#[from] CmapConflict),

    #[error("outline of glyph '{glyph}' is malformed: {reason}")]
    MalformedOutline { glyph: String, reason: String },

    #[error("font validation failed: {0}")]
    ValidationFailure(String),

    #[error("error reading or writing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
