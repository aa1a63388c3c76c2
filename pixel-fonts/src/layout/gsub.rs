//! Building the `GSUB` table.

use std::collections::BTreeSet;

use write_fonts::{
    tables::{
        gsub::{
            builders::{LigatureSubBuilder, SingleSubBuilder},
            Gsub, SubstitutionChainContext, SubstitutionLookup,
        },
        layout::{
            builders::Builder, ChainedSequenceContext, ChainedSequenceContextFormat3,
            CoverageTable, Feature, FeatureList, FeatureRecord, LangSys, Lookup, LookupFlag,
            LookupList, Script, ScriptList, ScriptRecord, SequenceLookupRecord,
        },
        variations::ivs_builder::VariationStoreBuilder,
    },
    types::{GlyphId16, Tag},
};

use super::{AlternateRecord, ChainRule, LigatureRecord};

const LIGA: Tag = Tag::new(b"liga");
const SALT: Tag = Tag::new(b"salt");
const CALT: Tag = Tag::new(b"calt");
const DFLT: Tag = Tag::new(b"DFLT");

/// Compile substitution records into a `GSUB` table.
///
/// Ligatures become a `liga` lookup, alternates a `salt` lookup, and
/// contextual rules a `calt` lookup that applies the alternates. Returns
/// `None` if there is nothing to substitute.
pub fn compile_gsub(
    ligatures: &[LigatureRecord],
    alternates: &[AlternateRecord],
    contextual: &[ChainRule],
) -> Option<Gsub> {
    let mut lookups = Vec::new();
    let mut features = Vec::new();

    if let Some(lookup) = ligature_lookup(ligatures) {
        features.push((LIGA, lookups.len() as u16));
        lookups.push(lookup);
    }

    if let Some(lookup) = alternate_lookup(alternates) {
        let alternate_index = lookups.len() as u16;
        features.push((SALT, alternate_index));
        lookups.push(lookup);
        if let Some(lookup) = contextual_lookup(contextual, alternate_index) {
            features.push((CALT, lookups.len() as u16));
            lookups.push(lookup);
        }
    } else if !contextual.is_empty() {
        log::warn!("no alternates for contextual rules to apply, skipping 'calt'");
    }

    if lookups.is_empty() {
        return None;
    }

    // feature records are sorted by tag
    features.sort_by_key(|(tag, _)| *tag);
    let lang_sys = LangSys {
        required_feature_index: 0xFFFF,
        feature_indices: (0..features.len() as u16).collect(),
    };
    let script_list = ScriptList::new(vec![ScriptRecord::new(
        DFLT,
        Script::new(Some(lang_sys), Vec::new()),
    )]);
    let feature_list = FeatureList::new(
        features
            .into_iter()
            .map(|(tag, lookup)| FeatureRecord::new(tag, Feature::new(None, vec![lookup])))
            .collect(),
    );
    Some(Gsub::new(script_list, feature_list, LookupList::new(lookups)))
}

fn ligature_lookup(ligatures: &[LigatureRecord]) -> Option<SubstitutionLookup> {
    let mut builder = LigatureSubBuilder::default();
    for record in ligatures.iter().filter(|record| !record.sequence.is_empty()) {
        if !builder.can_add(&record.sequence, record.replacement) {
            log::warn!(
                "ligature {:?} already has a glyph, ignoring {}",
                record.sequence,
                record.replacement
            );
            continue;
        }
        builder.insert(record.sequence.clone(), record.replacement);
    }
    // longer sequences come first in each set, and subtables split at 64k
    let subtables = builder.build(&mut VariationStoreBuilder::new(0));
    if subtables.is_empty() {
        return None;
    }
    Some(SubstitutionLookup::Ligature(Lookup::new(
        LookupFlag::empty(),
        subtables,
    )))
}

fn alternate_lookup(alternates: &[AlternateRecord]) -> Option<SubstitutionLookup> {
    let mut builder = SingleSubBuilder::default();
    for record in alternates {
        if !builder.can_add(record.source, record.replacement) {
            log::warn!(
                "glyph {} has several alternates, using {}",
                record.source,
                record.replacement
            );
        }
        builder.insert(record.source, record.replacement);
    }
    if builder.is_empty() {
        return None;
    }
    Some(SubstitutionLookup::Single(Lookup::new(
        LookupFlag::empty(),
        builder.build(&mut VariationStoreBuilder::new(0)),
    )))
}

fn contextual_lookup(rules: &[ChainRule], alternate_index: u16) -> Option<SubstitutionLookup> {
    let to_coverage = |glyphs: &BTreeSet<GlyphId16>| glyphs.iter().copied().collect::<CoverageTable>();
    let subtables: Vec<_> = rules
        .iter()
        .filter(|rule| {
            !rule.input.is_empty()
                && rule
                    .backtrack
                    .iter()
                    .chain(rule.lookahead.iter())
                    .all(|glyphs| !glyphs.is_empty())
        })
        .map(|rule| {
            let format3 = ChainedSequenceContextFormat3::new(
                rule.backtrack.iter().map(to_coverage).collect(),
                vec![to_coverage(&rule.input)],
                rule.lookahead.iter().map(to_coverage).collect(),
                vec![SequenceLookupRecord::new(0, alternate_index)],
            );
            SubstitutionChainContext::from(ChainedSequenceContext::Format3(format3))
        })
        .collect();
    if subtables.is_empty() {
        return None;
    }
    Some(SubstitutionLookup::ChainContextual(Lookup::new(
        LookupFlag::empty(),
        subtables,
    )))
}

#[cfg(test)]
mod tests {
    use write_fonts::{
        dump_table,
        read::{tables::gsub as read_gsub, FontData, FontRead},
    };

    use super::*;

    fn gid(id: u16) -> GlyphId16 {
        GlyphId16::new(id)
    }

    fn ligature(sequence: &[u16], replacement: u16) -> LigatureRecord {
        LigatureRecord {
            sequence: sequence.iter().copied().map(gid).collect(),
            replacement: gid(replacement),
        }
    }

    fn alternate(source: u16, replacement: u16) -> AlternateRecord {
        AlternateRecord {
            source: gid(source),
            replacement: gid(replacement),
        }
    }

    fn feature_tags(gsub: &read_gsub::Gsub) -> Vec<Tag> {
        gsub.feature_list()
            .unwrap()
            .feature_records()
            .iter()
            .map(|record| record.feature_tag())
            .collect()
    }

    #[test]
    fn nothing_to_substitute() {
        assert!(compile_gsub(&[], &[], &[]).is_none());
    }

    #[test]
    fn features_are_sorted() {
        let rule = ChainRule {
            backtrack: vec![],
            input: [gid(1)].into(),
            lookahead: vec![[gid(2)].into()],
        };
        let gsub = compile_gsub(&[ligature(&[1, 2], 3)], &[alternate(1, 4)], &[rule]).unwrap();
        let bytes = dump_table(&gsub).unwrap();
        let gsub = read_gsub::Gsub::read(FontData::new(&bytes)).unwrap();
        assert_eq!(feature_tags(&gsub), [CALT, LIGA, SALT]);

        let lookups = gsub.lookup_list().unwrap();
        let types: Vec<_> = lookups
            .lookups()
            .iter()
            .map(|lookup| lookup.unwrap().lookup_type())
            .collect();
        // liga, salt, calt
        assert_eq!(types, [4, 1, 6]);

        let scripts = gsub.script_list().unwrap();
        assert_eq!(scripts.script_records()[0].script_tag(), DFLT);
    }

    #[test]
    fn ligature_sets_put_longer_sequences_first() {
        let gsub = compile_gsub(
            &[
                ligature(&[5], 9),
                ligature(&[5, 6], 8),
                ligature(&[5, 6, 6], 7),
                ligature(&[5, 6], 10),
            ],
            &[],
            &[],
        )
        .unwrap();
        let bytes = dump_table(&gsub).unwrap();
        let gsub = read_gsub::Gsub::read(FontData::new(&bytes)).unwrap();
        let lookup = gsub.lookup_list().unwrap().lookups().get(0).unwrap();
        let read_gsub::SubstitutionSubtables::Ligature(subtables) = lookup.subtables().unwrap()
        else {
            panic!("expected a ligature lookup");
        };
        let subtable = subtables.get(0).unwrap();
        let set = subtable.ligature_sets().get(0).unwrap();
        let produced: Vec<_> = set
            .ligatures()
            .iter()
            .map(|lig| {
                let lig = lig.unwrap();
                (lig.component_glyph_ids().len(), lig.ligature_glyph().to_u16())
            })
            .collect();
        // the conflicting [5, 6] -> 10 is dropped
        assert_eq!(produced, [(2, 7), (1, 8), (0, 9)]);
    }

    #[test]
    fn large_ligature_lookups_are_split() {
        let components: Vec<u16> = (1..20).collect();
        let ligatures: Vec<_> = (100..2100u16)
            .map(|first| {
                let sequence: Vec<_> = std::iter::once(first)
                    .chain(components.iter().copied())
                    .collect();
                ligature(&sequence, 3000)
            })
            .collect();
        let Some(SubstitutionLookup::Ligature(lookup)) = ligature_lookup(&ligatures) else {
            panic!("expected a ligature lookup");
        };
        assert!(lookup.subtables.len() > 1);
    }

    #[test]
    fn later_alternate_wins() {
        let gsub = compile_gsub(&[], &[alternate(1, 4), alternate(1, 6), alternate(2, 5)], &[])
            .unwrap();
        let bytes = dump_table(&gsub).unwrap();
        let gsub = read_gsub::Gsub::read(FontData::new(&bytes)).unwrap();
        let lookup = gsub.lookup_list().unwrap().lookups().get(0).unwrap();
        let read_gsub::SubstitutionSubtables::Single(subtables) = lookup.subtables().unwrap()
        else {
            panic!("expected a single substitution lookup");
        };
        let read_gsub::SingleSubst::Format2(subtable) = subtables.get(0).unwrap() else {
            panic!("uneven deltas need format 2");
        };
        let substitutes: Vec<_> = subtable
            .substitute_glyph_ids()
            .iter()
            .map(|id| id.get().to_u16())
            .collect();
        assert_eq!(substitutes, [6, 5]);
    }

    #[test]
    fn contextual_rules_need_alternates() {
        let rule = ChainRule {
            backtrack: vec![],
            input: [gid(1)].into(),
            lookahead: vec![],
        };
        let gsub = compile_gsub(&[ligature(&[1, 2], 3)], &[], &[rule]).unwrap();
        let bytes = dump_table(&gsub).unwrap();
        let gsub = read_gsub::Gsub::read(FontData::new(&bytes)).unwrap();
        assert_eq!(feature_tags(&gsub), [LIGA]);
    }
}
