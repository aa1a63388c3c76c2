//! The glyph store: one descriptor per glyph key, in insertion order.
//!
//! A store is created from user-authored overrides and then has the layers of
//! each sprite sheet merged into it. Iteration order is the order in which
//! keys were first seen, and automatic glyph indices follow that order.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::Error,
    glyph::{GlyphDescriptor, GlyphOverrides},
    sheet::{Layer, SheetOptions},
};

/// The contents of a metadata overrides file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    #[serde(default)]
    pub glyphs: IndexMap<String, GlyphOverrides>,
}

impl Metadata {
    /// Parse overrides from TOML text; `path` is only used for errors.
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::parse(path, e))
    }

    /// Read and parse the overrides file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(path, &text)
    }
}

/// An ordered collection of glyph descriptors, keyed by glyph key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphStore {
    glyphs: IndexMap<String, GlyphDescriptor>,
}

impl GlyphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one descriptor per overridden key.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, Error> {
        let glyphs = metadata
            .glyphs
            .iter()
            .map(|(key, overrides)| {
                GlyphDescriptor::from_overrides(key, overrides).map(|glyph| (key.clone(), glyph))
            })
            .collect::<Result<_, _>>()?;
        Ok(GlyphStore { glyphs })
    }

    /// Merge the layers of one sprite sheet into the store.
    ///
    /// Each layer becomes (or updates) the glyph keyed by the optional prefix
    /// followed by the layer name. Geometry always comes from the layer; the
    /// other attributes of an existing descriptor are kept.
    pub fn merge_layers(&mut self, layers: Vec<Layer>, options: &SheetOptions) {
        let prefix = options.prefix.as_deref().unwrap_or_default();
        for Layer { name, bitmap } in layers {
            let key = format!("{prefix}{name}");
            let glyph = self
                .glyphs
                .entry(key)
                .or_insert_with_key(|key| GlyphDescriptor::new(key.as_str()));
            if glyph.bitmap.is_some() {
                log::debug!("layer '{name}' replaces the pixels of '{}'", glyph.key);
            }
            glyph.bitmap = Some(bitmap);
            if options.auto_code_point && glyph.code_point.is_none() {
                glyph.code_point = glyph.key.chars().next();
            }
        }
    }

    /// Insert a descriptor under its own key, returning any descriptor it replaced.
    ///
    /// A replaced descriptor keeps its position in the iteration order.
    pub fn insert(&mut self, glyph: GlyphDescriptor) -> Option<GlyphDescriptor> {
        self.glyphs.insert(glyph.key.clone(), glyph)
    }

    pub fn get(&self, key: &str) -> Option<&GlyphDescriptor> {
        self.glyphs.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut GlyphDescriptor> {
        self.glyphs.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.glyphs.contains_key(key)
    }

    /// Iterate the descriptors in store order.
    pub fn iter(&self) -> impl Iterator<Item = &GlyphDescriptor> + '_ {
        self.glyphs.values()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl FromIterator<GlyphDescriptor> for GlyphStore {
    fn from_iter<T: IntoIterator<Item = GlyphDescriptor>>(iter: T) -> Self {
        let mut store = GlyphStore::new();
        for glyph in iter {
            store.insert(glyph);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{glyph::Bitmap, testing::test_data_store};

    fn layer(name: &str, offset: (i32, i32)) -> Layer {
        Layer {
            name: name.into(),
            bitmap: Bitmap::new(name, 1, 1, offset.0, offset.1, vec![true]).unwrap(),
        }
    }

    #[test]
    fn new_layers_are_appended() {
        let mut store = GlyphStore::new();
        store.insert(GlyphDescriptor::new("z"));
        store.merge_layers(vec![layer("a", (0, 0))], &SheetOptions::default());
        let keys: Vec<_> = store.iter().map(|glyph| glyph.key.as_str()).collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(store.get("a").unwrap().name, "a");
    }

    #[test]
    fn geometry_always_comes_from_layers() {
        let mut store = GlyphStore::new();
        let mut glyph = GlyphDescriptor::new("a");
        glyph.name = "alpha".into();
        glyph.bitmap = Some(Bitmap::new("a", 1, 1, 5, 5, vec![false]).unwrap());
        store.insert(glyph);

        store.merge_layers(vec![layer("a", (1, 2))], &SheetOptions::default());
        let glyph = store.get("a").unwrap();
        assert_eq!(glyph.name, "alpha");
        let bitmap = glyph.bitmap.as_ref().unwrap();
        assert_eq!((bitmap.offset_x(), bitmap.offset_y()), (1, 2));
        assert_eq!(bitmap.pixels(), &[true]);
    }

    #[test]
    fn prefix_and_auto_code_point() {
        let mut store = GlyphStore::new();
        let mut existing = GlyphDescriptor::new("tp.b");
        existing.code_point = Some('!');
        store.insert(existing);

        let options = SheetOptions {
            prefix: Some("tp.".into()),
            auto_code_point: true,
        };
        store.merge_layers(vec![layer("a", (0, 0)), layer("b", (0, 0))], &options);
        // the first character of the (prefixed) name
        assert_eq!(store.get("tp.a").unwrap().code_point, Some('t'));
        // existing code points win
        assert_eq!(store.get("tp.b").unwrap().code_point, Some('!'));
        assert!(!store.contains("a"));
    }

    #[test]
    fn auto_code_point_ignores_renames() {
        let metadata = Metadata::from_toml(
            Path::new("metadata.toml"),
            "[glyphs.\"^\"]\nname = \"caret\"\n",
        )
        .unwrap();
        let mut store = GlyphStore::from_metadata(&metadata).unwrap();
        let options = SheetOptions {
            prefix: None,
            auto_code_point: true,
        };
        store.merge_layers(vec![layer("^", (0, 0))], &options);
        let glyph = store.get("^").unwrap();
        assert_eq!(glyph.name, "caret");
        assert_eq!(glyph.code_point, Some('^'));
    }

    #[test]
    fn merge_test_data() {
        let store = test_data_store();
        let keys: Vec<_> = store.iter().map(|glyph| glyph.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "space",
                "space.cart",
                "l",
                "^",
                "tp.startcart",
                "tp.endcart",
                "tp.an",
                "a",
                "n",
                "[",
                "]",
                "tp.la",
            ]
        );
        assert!(store.get("space").unwrap().bitmap.is_none());
        assert_eq!(store.get("space").unwrap().code_point, Some(' '));
        assert_eq!(store.get("l").unwrap().code_point, Some('l'));
        assert_eq!(store.get("l").unwrap().index, Some(12));
        assert_eq!(store.get("tp.la").unwrap().code_point, None);
        assert!(store.get("space.cart").unwrap().bitmap.is_some());
    }
}
