//! The contextual rules that switch runs of words into cartouche forms.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use write_fonts::types::GlyphId16;

use super::ChainRule;
use crate::cartouche::CartoucheConfig;

/// Derive the rules that put every word between a start and an end glyph
/// into its cartouche form.
///
/// `glyphs` are `(name, id)` pairs. The rules, in order:
///
/// 1. a word preceded by a cartouche form and followed by a word or the end
/// 2. the start glyph followed by a word
/// 3. the end glyph preceded by the cartouche form of a word
///
/// No rules are produced unless both the start and end glyphs are
/// configured and present along with their cartouche forms.
pub fn cartouche_rules<'a>(
    glyphs: impl IntoIterator<Item = (&'a str, GlyphId16)>,
    config: &CartoucheConfig,
) -> Vec<ChainRule> {
    let ids: IndexMap<&str, GlyphId16> = glyphs.into_iter().collect();
    let (Some(start), Some(end)) = (config.start.as_deref(), config.end.as_deref()) else {
        log::debug!("no cartouche start and end glyphs, skipping contextual rules");
        return Vec::new();
    };
    let cartouche_of = |name: &str| ids.get(config.cartouche_name(name).as_str()).copied();
    let (Some(start_id), Some(start_form), Some(end_id), Some(_)) = (
        ids.get(start).copied(),
        cartouche_of(start),
        ids.get(end).copied(),
        cartouche_of(end),
    ) else {
        log::warn!("cartouche glyphs '{start}' or '{end}' are missing, skipping contextual rules");
        return Vec::new();
    };

    let mut words = BTreeSet::new();
    let mut forms = BTreeSet::new();
    for (name, id) in ids.iter() {
        let is_word = name.starts_with(config.word_prefix.as_str())
            || config.joiners.iter().any(|joiner| joiner == name);
        if !is_word || config.is_cartouche_name(name) || *name == start || *name == end {
            continue;
        }
        if let Some(form) = cartouche_of(*name) {
            words.insert(*id);
            forms.insert(form);
        }
    }
    if words.is_empty() {
        return Vec::new();
    }

    let mut after_start = forms.clone();
    after_start.insert(start_form);
    let mut before_end = words.clone();
    before_end.insert(end_id);

    vec![
        ChainRule {
            backtrack: vec![after_start],
            input: words.clone(),
            lookahead: vec![before_end],
        },
        ChainRule {
            backtrack: Vec::new(),
            input: BTreeSet::from([start_id]),
            lookahead: vec![words],
        },
        ChainRule {
            backtrack: vec![forms],
            input: BTreeSet::from([end_id]),
            lookahead: Vec::new(),
        },
    ]
}
