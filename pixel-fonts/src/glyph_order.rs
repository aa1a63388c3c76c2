//! Assigning glyph ids to the glyphs of a store.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use write_fonts::types::GlyphId16;

use crate::{error::Error, layout::Resolution, store::GlyphStore};

/// The largest glyph id a glyph may be given.
///
/// The glyph count is stored in a `u16`, so the last id is unusable.
pub const MAX_GLYPH_ID: u32 = u16::MAX as u32 - 1;

/// Hands out glyph ids, never the same one twice.
///
/// Explicitly requested ids are reserved first, then every other glyph gets
/// the lowest id that is still free. Id 0 is always taken by `.notdef`.
#[derive(Clone, Debug)]
pub struct IndexAllocator {
    // id -> key of the glyph that holds it
    used: BTreeMap<u16, String>,
    next: u16,
}

impl IndexAllocator {
    pub fn new() -> Self {
        IndexAllocator {
            used: BTreeMap::new(),
            next: 1,
        }
    }

    /// Reserve `index` for the glyph keyed by `key`.
    pub fn reserve(&mut self, key: &str, index: u32) -> Result<GlyphId16, Error> {
        if index == 0 {
            return Err(Error::ReservedIndex {
                glyph: key.to_owned(),
            });
        }
        if index > MAX_GLYPH_ID {
            return Err(Error::IndexOutOfRange {
                glyph: key.to_owned(),
                index,
            });
        }
        let id = index as u16;
        if let Some(first) = self.used.get(&id) {
            return Err(Error::DuplicateIndex {
                index,
                first: first.clone(),
                second: key.to_owned(),
            });
        }
        self.used.insert(id, key.to_owned());
        Ok(GlyphId16::new(id))
    }

    /// Give the glyph keyed by `key` the lowest free id.
    pub fn allocate(&mut self, key: &str) -> Result<GlyphId16, Error> {
        while self.used.contains_key(&self.next) {
            self.next += 1;
        }
        let index = self.next as u32;
        self.reserve(key, index)
    }
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The glyph id of every glyph key in a store, in store order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphOrder {
    ids: IndexMap<String, GlyphId16>,
}

impl GlyphOrder {
    /// Assign ids to every glyph in `store`.
    ///
    /// Explicit indices are honoured and must be unique; the remaining glyphs
    /// are numbered in store order, skipping ids that are already taken.
    pub fn assign(store: &GlyphStore) -> Result<Self, Error> {
        let mut allocator = IndexAllocator::new();
        let mut explicit = IndexMap::new();
        for glyph in store.iter() {
            if let Some(index) = glyph.index {
                explicit.insert(glyph.key.as_str(), allocator.reserve(&glyph.key, index)?);
            }
        }

        let mut ids = IndexMap::with_capacity(store.len());
        for glyph in store.iter() {
            let id = match explicit.get(glyph.key.as_str()) {
                Some(id) => *id,
                None => allocator.allocate(&glyph.key)?,
            };
            log::debug!("'{}' gets glyph id {}", glyph.key, id.to_u16());
            ids.insert(glyph.key.clone(), id);
        }
        Ok(GlyphOrder { ids })
    }

    /// The id of the glyph keyed by `key`.
    pub fn get(&self, key: &str) -> Option<GlyphId16> {
        self.ids.get(key).copied()
    }

    pub fn resolve(&self, key: &str) -> Resolution {
        match self.get(key) {
            Some(id) => Resolution::Resolved(id),
            None => Resolution::Unresolved(key.to_owned()),
        }
    }

    /// Iterate `(key, id)` pairs in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GlyphId16)> + '_ {
        self.ids.iter().map(|(key, id)| (key.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
