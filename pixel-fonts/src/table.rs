//! The glyph table: glyphs in id order, with their substitutions.
//!
//! [`GlyphTableBuilder::build`] is a pure function of the store, so building
//! twice from the same store gives the same table.

use kurbo::BezPath;
use write_fonts::types::GlyphId16;

use crate::{
    cartouche::CartoucheConfig,
    error::Error,
    glyph_order::GlyphOrder,
    layout::{
        cartouche_rules, AlternateRecord, ChainRule, LigatureRecord, Resolver, UnresolvedKey,
        UnresolvedPolicy,
    },
    outline::{rasterize, Metrics},
    store::GlyphStore,
};

/// One compiled glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphEntry {
    pub key: String,
    pub name: String,
    pub id: GlyphId16,
    pub code_point: Option<char>,
    pub advance_width: u16,
    pub outline: BezPath,
}

/// Everything the font assembler needs.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphTable {
    pub metrics: Metrics,
    /// Sorted by id. Id 0 and any unclaimed ids are absent.
    pub glyphs: Vec<GlyphEntry>,
    /// Sorted by descending sequence length.
    pub ligatures: Vec<LigatureRecord>,
    pub alternates: Vec<AlternateRecord>,
    pub contextual: Vec<ChainRule>,
    /// Keys that could not be resolved and were replaced by `.notdef`.
    pub unresolved: Vec<UnresolvedKey>,
}

impl GlyphTable {
    /// The number of glyphs in the font, counting `.notdef` and gaps.
    pub fn num_glyphs(&self) -> u16 {
        self.glyphs
            .last()
            .map(|glyph| glyph.id.to_u16() + 1)
            .unwrap_or(1)
    }

    pub fn get(&self, key: &str) -> Option<&GlyphEntry> {
        self.glyphs.iter().find(|glyph| glyph.key == key)
    }
}

/// Compiles a [`GlyphStore`] into a [`GlyphTable`].
#[derive(Clone, Debug, Default)]
pub struct GlyphTableBuilder {
    metrics: Metrics,
    policy: UnresolvedPolicy,
    cartouche: CartoucheConfig,
}

impl GlyphTableBuilder {
    pub fn new(metrics: Metrics) -> Self {
        GlyphTableBuilder {
            metrics,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The naming conventions used to derive contextual cartouche rules.
    pub fn with_cartouche(mut self, config: CartoucheConfig) -> Self {
        self.cartouche = config;
        self
    }

    pub fn build(&self, store: &GlyphStore) -> Result<GlyphTable, Error> {
        let order = GlyphOrder::assign(store)?;
        let mut resolver = Resolver::new(&order, self.policy);
        let mut glyphs = Vec::with_capacity(store.len());
        let mut ligatures = Vec::new();
        let mut alternates = Vec::new();

        // the order lists keys in store order
        for (glyph, (_, id)) in store.iter().zip(order.iter()) {
            let outline = glyph
                .bitmap
                .as_ref()
                .map(|bitmap| rasterize(bitmap, &self.metrics))
                .unwrap_or_default();
            let advance_width = if glyph.zero_advance {
                0
            } else {
                self.metrics.units_per_em
            };
            glyphs.push(GlyphEntry {
                key: glyph.key.clone(),
                name: glyph.name.clone(),
                id,
                code_point: glyph.code_point,
                advance_width,
                outline,
            });

            for source in glyph.ligatures.iter().flatten() {
                if source.is_empty() {
                    log::warn!("ignoring empty ligature for '{}'", glyph.key);
                    continue;
                }
                let sequence = source
                    .chars()
                    .map(|c| resolver.resolve(&glyph.key, &c.to_string()))
                    .collect::<Result<_, _>>()?;
                ligatures.push(LigatureRecord {
                    sequence,
                    replacement: id,
                });
            }

            if let Some(source) = glyph.alternate.as_deref() {
                alternates.push(AlternateRecord {
                    source: resolver.resolve(&glyph.key, source)?,
                    replacement: id,
                });
            }
        }

        glyphs.sort_by_key(|glyph| glyph.id);
        // stable, so equal lengths keep store order
        ligatures.sort_by_key(|lig: &LigatureRecord| std::cmp::Reverse(lig.sequence.len()));
        let contextual = cartouche_rules(
            glyphs.iter().map(|glyph| (glyph.name.as_str(), glyph.id)),
            &self.cartouche,
        );
        log::debug!(
            "built {} glyphs, {} ligatures, {} alternates",
            glyphs.len(),
            ligatures.len(),
            alternates.len()
        );

        Ok(GlyphTable {
            metrics: self.metrics,
            glyphs,
            ligatures,
            alternates,
            contextual,
            unresolved: resolver.into_unresolved(),
        })
    }
}
