//! test data shared between the pixel-fonts crates.
//!
//! The files under `test_data/` also make up a complete build plan, so the
//! directory can be handed to the `pixel-fonts` binary as-is.

use std::path::PathBuf;

/// Sprite sheet holding the single-character glyphs.
pub static CHARS_SHEET: &str = include_str!("../test_data/chars.json");

/// Sprite sheet holding the word glyphs, loaded with a `tp.` prefix.
pub static WORDS_SHEET: &str = include_str!("../test_data/words.json");

/// Hand-drawn cartouche forms that are not synthesized.
pub static FRAMES_SHEET: &str = include_str!("../test_data/frames.json");

pub static METADATA: &str = include_str!("../test_data/metadata.toml");

pub static PLAN: &str = include_str!("../test_data/plan.toml");

/// The location of the test data directory on disk.
pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data")
}

/// The location of `plan.toml` on disk.
pub fn plan_path() -> PathBuf {
    test_data_dir().join("plan.toml")
}
