//! Synthesizing cartouche forms of word glyphs.
//!
//! A word glyph is placed in a fixed 8×7 frame. Depending on its
//! [`CartoucheRole`] each row is filled towards the open side of the frame,
//! or (with no role) the whole frame is inverted so that the word appears cut
//! out of a solid block.

use serde::Deserialize;

use crate::{
    error::Error,
    glyph::{Bitmap, CartoucheRole, GlyphDescriptor},
    store::GlyphStore,
};

pub const FRAME_WIDTH: u32 = 8;
pub const FRAME_HEIGHT: u32 = 7;

/// Naming conventions for word glyphs and their cartouche forms.
///
/// `start`, `end` and `joiners` drive the contextual substitution that
/// switches runs of words into their cartouche forms.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartoucheConfig {
    /// Glyph names starting with this are words.
    pub word_prefix: String,
    /// Appended to a word's name to name its cartouche form.
    pub suffix: String,
    /// The glyph that opens a cartouche.
    pub start: Option<String>,
    /// The glyph that closes a cartouche.
    pub end: Option<String>,
    /// Non-word glyphs that may appear inside a cartouche.
    pub joiners: Vec<String>,
}

impl Default for CartoucheConfig {
    fn default() -> Self {
        CartoucheConfig {
            word_prefix: "tp.".into(),
            suffix: ".cart".into(),
            start: None,
            end: None,
            joiners: Vec::new(),
        }
    }
}

impl CartoucheConfig {
    /// The name of the cartouche form of the glyph named `name`.
    pub fn cartouche_name(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }

    /// `true` if `name` is a cartouche form.
    pub fn is_cartouche_name(&self, name: &str) -> bool {
        name.ends_with(self.suffix.as_str())
    }
}

/// Return a copy of `store` with word ligatures filled in and a cartouche
/// form added for every word.
///
/// Words without explicit ligatures get the ligature spelled by their name
/// without the word prefix. Unless a word is already a cartouche form
/// ([`CartoucheRole::Inside`]) a new descriptor named with the cartouche
/// suffix is appended; it is an alternate for the word. The input store is
/// left untouched.
pub fn synthesize(store: &GlyphStore, config: &CartoucheConfig) -> Result<GlyphStore, Error> {
    let mut out = store.clone();
    let mut forms = Vec::new();

    for glyph in store.iter() {
        let Some(word) = glyph.name.strip_prefix(config.word_prefix.as_str()) else {
            continue;
        };
        if config.is_cartouche_name(&glyph.name) {
            continue;
        }
        if glyph.ligatures.is_none() {
            if let Some(target) = out.get_mut(&glyph.key) {
                target.ligatures = Some(vec![word.to_owned()]);
            }
        }
        if glyph.cartouche == Some(CartoucheRole::Inside) {
            continue;
        }
        forms.push(cartouche_form(glyph, config)?);
    }

    for form in forms {
        log::debug!("adding cartouche form '{}'", form.name);
        if let Some(prev) = out.insert(form) {
            log::warn!("synthesized cartouche replaces existing glyph '{}'", prev.key);
        }
    }
    Ok(out)
}

/// Build the cartouche form of a single word glyph.
pub fn cartouche_form(
    glyph: &GlyphDescriptor,
    config: &CartoucheConfig,
) -> Result<GlyphDescriptor, Error> {
    let bitmap = glyph
        .bitmap
        .as_ref()
        .ok_or_else(|| Error::MissingSourceGeometry {
            glyph: glyph.name.clone(),
        })?;
    let name = config.cartouche_name(&glyph.name);
    let mut pixels = frame_pixels(&glyph.name, bitmap, glyph.cartouche)?;
    if glyph.cartouche.is_none() {
        pixels = invert(&pixels);
    }
    let bitmap = Bitmap::new(&name, FRAME_WIDTH, FRAME_HEIGHT, 0, 0, pixels)?;
    Ok(GlyphDescriptor {
        key: name.clone(),
        name,
        bitmap: Some(bitmap),
        code_point: None,
        index: None,
        ligatures: None,
        alternate: Some(glyph.name.clone()),
        zero_advance: glyph.zero_advance,
        cartouche: Some(CartoucheRole::Inside),
    })
}

/// Place `bitmap` in the frame and apply the row fill for `role`.
///
/// The result has exactly `FRAME_WIDTH * FRAME_HEIGHT` cells and is not
/// inverted.
pub fn frame_pixels(
    name: &str,
    bitmap: &Bitmap,
    role: Option<CartoucheRole>,
) -> Result<Vec<bool>, Error> {
    let fits = |size: u32, offset: i32, limit: u32| {
        u32::try_from(offset)
            .ok()
            .and_then(|offset| size.checked_add(offset))
            .is_some_and(|end| end <= limit)
    };
    if !fits(bitmap.width(), bitmap.offset_x(), FRAME_WIDTH)
        || !fits(bitmap.height(), bitmap.offset_y(), FRAME_HEIGHT)
    {
        return Err(Error::CartoucheOverflow {
            glyph: name.to_owned(),
            width: bitmap.width(),
            height: bitmap.height(),
            offset_x: bitmap.offset_x(),
            offset_y: bitmap.offset_y(),
        });
    }

    let len = (FRAME_WIDTH * FRAME_HEIGHT) as usize;
    let mut frame = Vec::with_capacity(len);
    frame.resize((bitmap.offset_y() as u32 * FRAME_WIDTH) as usize, false);

    let column = bitmap.offset_x() as usize;
    for source in bitmap.rows().take(bitmap.height() as usize) {
        let mut row = vec![false; (FRAME_WIDTH - bitmap.width()) as usize];
        row.splice(column..column, source.iter().copied());
        match role {
            Some(CartoucheRole::Close) => fill_to_first(&mut row),
            Some(CartoucheRole::Open) => fill_from_first(&mut row),
            _ => (),
        }
        frame.extend(row);
    }

    frame.resize(len, false);
    Ok(frame)
}

/// Logical NOT of every cell.
pub fn invert(pixels: &[bool]) -> Vec<bool> {
    pixels.iter().map(|set| !set).collect()
}

// every cell before the first set cell becomes set
fn fill_to_first(row: &mut [bool]) {
    for cell in row.iter_mut().take_while(|cell| !**cell) {
        *cell = true;
    }
}

// every cell from the first set cell onwards becomes set
fn fill_from_first(row: &mut [bool]) {
    if let Some(first) = row.iter().position(|cell| *cell) {
        row[first..].fill(true);
    }
}
