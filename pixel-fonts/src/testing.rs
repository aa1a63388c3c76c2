//! Fixtures built from the sample glyph data.

use std::path::Path;

use crate::{
    cartouche::CartoucheConfig,
    sheet::{SheetOptions, SpriteSheet},
    store::{GlyphStore, Metadata},
};

/// The sample metadata with every sample sheet merged in, as the sample plan
/// describes.
pub(crate) fn test_data_store() -> GlyphStore {
    let metadata =
        Metadata::from_toml(Path::new("metadata.toml"), pixel_test_data::METADATA).unwrap();
    let mut store = GlyphStore::from_metadata(&metadata).unwrap();
    for (text, options) in [
        (
            pixel_test_data::CHARS_SHEET,
            SheetOptions {
                prefix: None,
                auto_code_point: true,
            },
        ),
        (
            pixel_test_data::WORDS_SHEET,
            SheetOptions {
                prefix: Some("tp.".into()),
                auto_code_point: false,
            },
        ),
        (pixel_test_data::FRAMES_SHEET, SheetOptions::default()),
    ] {
        let sheet = SpriteSheet::from_json(Path::new("sheet.json"), text).unwrap();
        store.merge_layers(sheet.layers().unwrap(), &options);
    }
    store
}

pub(crate) fn test_data_cartouche() -> CartoucheConfig {
    CartoucheConfig {
        start: Some("tp.startcart".into()),
        end: Some("tp.endcart".into()),
        joiners: vec!["space".into()],
        ..Default::default()
    }
}
