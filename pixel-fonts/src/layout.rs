//! Glyph substitution records and their compilation into `GSUB`.

mod contextual;
mod gsub;

use std::collections::BTreeSet;

use serde::Deserialize;
use write_fonts::types::GlyphId16;

use crate::{error::Error, glyph_order::GlyphOrder};

pub use contextual::cartouche_rules;
pub use gsub::compile_gsub;

/// Replace a sequence of glyphs with a single glyph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LigatureRecord {
    pub sequence: Vec<GlyphId16>,
    pub replacement: GlyphId16,
}

/// Replace one glyph with an alternate form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlternateRecord {
    pub source: GlyphId16,
    pub replacement: GlyphId16,
}

/// A chained contextual rule that swaps the input glyph for its alternate.
///
/// Each position holds the set of glyphs that may appear there. Backtrack
/// positions are listed closest to the input first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainRule {
    pub backtrack: Vec<BTreeSet<GlyphId16>>,
    pub input: BTreeSet<GlyphId16>,
    pub lookahead: Vec<BTreeSet<GlyphId16>>,
}

/// The outcome of looking up a glyph key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(GlyphId16),
    Unresolved(String),
}

/// What to do when a substitution names a glyph key that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Log a warning and substitute `.notdef`.
    #[default]
    Warn,
    /// Fail the build.
    Error,
}

/// A substitution source that named a missing glyph key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedKey {
    /// The key of the glyph whose substitution referenced `key`.
    pub glyph: String,
    pub key: String,
}

/// Resolves glyph keys to ids, applying an [`UnresolvedPolicy`].
pub(crate) struct Resolver<'a> {
    order: &'a GlyphOrder,
    policy: UnresolvedPolicy,
    unresolved: Vec<UnresolvedKey>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(order: &'a GlyphOrder, policy: UnresolvedPolicy) -> Self {
        Resolver {
            order,
            policy,
            unresolved: Vec::new(),
        }
    }

    /// The id of `key`, as referenced by the glyph keyed by `glyph`.
    pub(crate) fn resolve(&mut self, glyph: &str, key: &str) -> Result<GlyphId16, Error> {
        match self.order.resolve(key) {
            Resolution::Resolved(id) => Ok(id),
            Resolution::Unresolved(key) => match self.policy {
                UnresolvedPolicy::Error => Err(Error::UnresolvedSubstitutionKey {
                    glyph: glyph.to_owned(),
                    key,
                }),
                UnresolvedPolicy::Warn => {
                    log::warn!("'{glyph}' references unknown glyph '{key}', using .notdef");
                    self.unresolved.push(UnresolvedKey {
                        glyph: glyph.to_owned(),
                        key,
                    });
                    Ok(GlyphId16::NOTDEF)
                }
            },
        }
    }

    pub(crate) fn into_unresolved(self) -> Vec<UnresolvedKey> {
        self.unresolved
    }
}
