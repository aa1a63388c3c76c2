//! Glyph descriptors: everything known about a glyph before it is compiled.

use serde::Deserialize;

use crate::error::Error;

/// How a word glyph behaves when it is placed inside a cartouche.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartoucheRole {
    /// Opens a cartouche; rows are filled from the first set pixel rightwards.
    Open,
    /// Already a cartouche form; never synthesized again.
    Inside,
    /// Closes a cartouche; rows are filled up to the first set pixel.
    Close,
}

/// A rectangular grid of pixels placed in the em box.
///
/// Pixels are stored row-major, top row first. Offsets are in pixel units
/// relative to the top-left of the em box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Create a new bitmap, checking that `pixels` covers the whole grid.
    ///
    /// `name` identifies the glyph or layer in the error.
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        offset_x: i32,
        offset_y: i32,
        pixels: Vec<bool>,
    ) -> Result<Self, Error> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::MalformedBitmap {
                layer: name.to_owned(),
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Bitmap {
            width,
            height,
            offset_x,
            offset_y,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> i32 {
        self.offset_y
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Iterate the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        // chunks() panics on zero
        self.pixels.chunks(self.width.max(1) as usize)
    }

    /// Iterate the grid coordinates of every set pixel, in row-major order.
    pub fn filled(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i as u32 % width, i as u32 / width))
    }
}

/// Everything known about a single glyph.
///
/// The `key` is the identity used by lookups (ligature and alternate sources
/// refer to glyphs by key); `name` is what ends up in the font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphDescriptor {
    pub key: String,
    pub name: String,
    /// The pixels of this glyph, if any sprite sheet provided them.
    pub bitmap: Option<Bitmap>,
    pub code_point: Option<char>,
    /// An explicitly requested glyph index.
    pub index: Option<u32>,
    /// Strings of single-character keys that this glyph replaces.
    pub ligatures: Option<Vec<String>>,
    /// The key of a glyph that this glyph is an alternate for.
    pub alternate: Option<String>,
    pub zero_advance: bool,
    pub cartouche: Option<CartoucheRole>,
}

impl GlyphDescriptor {
    /// A new descriptor whose name is its key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        GlyphDescriptor {
            name: key.clone(),
            key,
            ..Default::default()
        }
    }

    /// Create a descriptor from user-authored overrides.
    ///
    /// Fields that are not overridden take their defaults; the name defaults
    /// to the key.
    pub fn from_overrides(key: &str, overrides: &GlyphOverrides) -> Result<Self, Error> {
        let code_point = overrides
            .code_point
            .map(|value| {
                char::from_u32(value).ok_or_else(|| Error::InvalidCodePoint {
                    glyph: key.to_owned(),
                    value,
                })
            })
            .transpose()?;
        Ok(GlyphDescriptor {
            key: key.to_owned(),
            name: overrides.name.clone().unwrap_or_else(|| key.to_owned()),
            bitmap: None,
            code_point,
            index: overrides.index,
            ligatures: overrides.ligatures.clone(),
            alternate: overrides.alternate.clone(),
            zero_advance: overrides.zero_advance.unwrap_or_default(),
            cartouche: overrides.cartouche,
        })
    }
}

/// User-authored attributes for one glyph key.
///
/// There is no geometry here; pixels always come from a sprite sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlyphOverrides {
    pub name: Option<String>,
    pub index: Option<u32>,
    pub code_point: Option<u32>,
    pub ligatures: Option<Vec<String>>,
    pub alternate: Option<String>,
    pub zero_advance: Option<bool>,
    pub cartouche: Option<CartoucheRole>,
}
