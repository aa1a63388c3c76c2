//! Reading named bitmaps out of sprite sheet exports.
//!
//! A sheet is a JSON document listing the cels of a single frame:
//!
//! ```json
//! { "cels": [ { "layer": "a", "x": 2, "y": 3, "width": 1, "height": 1, "pixels": [1] } ] }
//! ```
//!
//! Pixel values are row-major and `1` marks a set pixel.

use std::path::Path;

use serde::Deserialize;

use crate::{error::Error, glyph::Bitmap};

/// Layers whose name starts with this are scratch layers and never become glyphs.
pub const IGNORE_MARKER: &str = "--";

/// The sprite canvas is one pixel larger than the em box on the top and left.
const CANVAS_OFFSET: i32 = 1;

/// The cels of one sprite sheet.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpriteSheet {
    pub cels: Vec<Cel>,
}

/// A single cel: the pixels one layer contributes to the frame.
#[derive(Clone, Debug, Deserialize)]
pub struct Cel {
    pub layer: String,
    /// Position of the cel on the sprite canvas.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A named bitmap taken from a sheet, positioned in em box pixel units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub bitmap: Bitmap,
}

/// Per-sheet options for merging layers into the glyph store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetOptions {
    /// Prepended to every layer name to form the glyph key.
    pub prefix: Option<String>,
    /// Map each glyph to the first character of its name, unless it already
    /// has a code point.
    pub auto_code_point: bool,
}

impl SpriteSheet {
    /// Parse a sheet from JSON text; `path` is only used for errors.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::parse(path, e))
    }

    /// Read and parse the sheet at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(path, &text)
    }

    /// Convert the cels of this sheet into positioned bitmaps.
    ///
    /// Scratch layers are skipped. Returns an error if any cel's pixel data
    /// does not match its dimensions.
    pub fn layers(&self) -> Result<Vec<Layer>, Error> {
        let mut layers = Vec::with_capacity(self.cels.len());
        for cel in &self.cels {
            if cel.layer.starts_with(IGNORE_MARKER) {
                log::debug!("skipping scratch layer '{}'", cel.layer);
                continue;
            }
            let pixels = cel.pixels.iter().map(|value| *value == 1).collect();
            let bitmap = Bitmap::new(
                &cel.layer,
                cel.width,
                cel.height,
                cel.x - CANVAS_OFFSET,
                cel.y - CANVAS_OFFSET,
                pixels,
            )?;
            layers.push(Layer {
                name: cel.layer.clone(),
                bitmap,
            });
        }
        Ok(layers)
    }
}
