//! Compiling pixel-grid glyphs into TrueType fonts.
//!
//! Glyphs are drawn as layers of sprite sheets on a small grid of square
//! pixels. A build runs in stages:
//!
//! 1. the layers of each [sheet](sheet::SpriteSheet) are merged with
//!    user-authored overrides into a [`GlyphStore`]
//! 2. [cartouche forms](cartouche) are synthesized for word glyphs
//! 3. the store is compiled into a [`GlyphTable`]: glyph ids, outlines and
//!    substitution records
//! 4. the table is [assembled](assemble()) into font bytes
//!
//! [`FontProject`] drives all of this from a [`BuildPlan`].
//!
//! ```no_run
//! # fn main() -> Result<(), pixel_fonts::Error> {
//! let mut project = pixel_fonts::FontProject::load("fonts/plan.toml".as_ref())?;
//! let path = project.build(true)?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod assemble;
pub mod cartouche;
pub mod error;
pub mod glyph;
pub mod glyph_order;
pub mod layout;
pub mod outline;
pub mod plan;
pub mod postprocess;
pub mod project;
pub mod sheet;
pub mod store;
pub mod table;

#[cfg(test)]
mod testing;

pub use assemble::{assemble, FontInfo};
pub use error::Error;
pub use glyph::{Bitmap, CartoucheRole, GlyphDescriptor};
pub use plan::BuildPlan;
pub use project::{CompiledFont, FontProject};
pub use store::GlyphStore;
pub use table::{GlyphTable, GlyphTableBuilder};

/// Expose the font compilation crate we build on.
pub extern crate write_fonts;
