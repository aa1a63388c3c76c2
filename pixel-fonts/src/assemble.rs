//! Assembling a glyph table into a TrueType font.

use kurbo::BezPath;
use write_fonts::{
    read::{FontRef, TableProvider},
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, NameId, UfWord},
    FontBuilder,
};

use crate::{error::Error, layout::compile_gsub, table::GlyphTable};

const NOTDEF: &str = ".notdef";

// Windows, Unicode BMP, US English
const PLATFORM_ID: u16 = 3;
const ENCODING_ID: u16 = 1;
const LANGUAGE_ID: u16 = 0x409;

/// Naming information for the font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontInfo {
    pub family: String,
    pub style: String,
    /// A dotted version string such as `1.0.0`.
    pub version: String,
    pub designer: Option<String>,
}

impl FontInfo {
    fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    fn postscript_name(&self) -> String {
        let mut name: String = self.family.chars().filter(|c| !c.is_whitespace()).collect();
        name.push('-');
        name.extend(self.style.chars().filter(|c| !c.is_whitespace()));
        name
    }

    /// The first two components of the version, as a number.
    fn revision(&self) -> Fixed {
        let mut parts = self.version.split('.').map(str::trim);
        let major = parts.next().unwrap_or("0");
        let minor = parts.next().unwrap_or("0");
        let revision = format!("{major}.{minor}").parse::<f64>().unwrap_or_else(|_| {
            log::warn!("cannot parse version '{}', using 0.0", self.version);
            0.0
        });
        Fixed::from_f64(revision)
    }

    fn name_table(&self) -> Name {
        let mut records = vec![
            (NameId::FAMILY_NAME, self.family.clone()),
            (NameId::SUBFAMILY_NAME, self.style.clone()),
            (
                NameId::UNIQUE_ID,
                format!("{};{}", self.version, self.postscript_name()),
            ),
            (NameId::FULL_NAME, self.full_name()),
            (NameId::VERSION_STRING, format!("Version {}", self.version)),
            (NameId::POSTSCRIPT_NAME, self.postscript_name()),
        ];
        if let Some(designer) = &self.designer {
            records.push((NameId::DESIGNER, designer.clone()));
        }
        let mut records: Vec<_> = records
            .into_iter()
            .map(|(id, value)| NameRecord::new(PLATFORM_ID, ENCODING_ID, LANGUAGE_ID, id, value.into()))
            .collect();
        records.sort();
        Name::new(records)
    }
}

/// Per-font totals gathered while compiling glyphs.
#[derive(Default)]
struct Extents {
    bbox: Option<Bbox>,
    advance_max: u16,
    min_lsb: Option<i16>,
    min_rsb: Option<i16>,
    x_max_extent: Option<i16>,
    max_points: u16,
    max_contours: u16,
}

impl Extents {
    fn add(&mut self, glyph: &SimpleGlyph, advance: u16) {
        self.advance_max = self.advance_max.max(advance);
        if glyph.contours.is_empty() {
            return;
        }
        let bbox = glyph.bbox;
        self.bbox = Some(self.bbox.map_or(bbox, |total| total.union(bbox)));
        let rsb = (advance as i32 - bbox.x_max as i32).clamp(i16::MIN as i32, i16::MAX as i32);
        self.min_lsb = Some(self.min_lsb.map_or(bbox.x_min, |v| v.min(bbox.x_min)));
        self.min_rsb = Some(self.min_rsb.map_or(rsb as i16, |v| v.min(rsb as i16)));
        self.x_max_extent = Some(self.x_max_extent.map_or(bbox.x_max, |v| v.max(bbox.x_max)));
        let points: usize = glyph.contours.iter().map(|contour| contour.len()).sum();
        self.max_points = self.max_points.max(points.min(u16::MAX as usize) as u16);
        self.max_contours = self
            .max_contours
            .max(glyph.contours.len().min(u16::MAX as usize) as u16);
    }
}

/// Compile `table` into the bytes of a TrueType font.
///
/// Glyph ids are preserved: `.notdef` is glyph 0 and any id that no glyph
/// claimed is filled with an empty, zero-width placeholder. The result is
/// parsed back before it is returned.
pub fn assemble(table: &GlyphTable, info: &FontInfo) -> Result<Vec<u8>, Error> {
    let upem = table.metrics.units_per_em;
    let num_glyphs = table.num_glyphs();

    let mut slots = vec![None; num_glyphs as usize];
    for glyph in &table.glyphs {
        slots[glyph.id.to_u16() as usize] = Some(glyph);
    }

    let mut names = Vec::with_capacity(slots.len());
    let mut glyf_loca = GlyfLocaBuilder::new();
    let mut h_metrics = Vec::with_capacity(slots.len());
    let mut extents = Extents::default();
    let empty = BezPath::new();
    for (gid, slot) in slots.iter().enumerate() {
        let (name, advance, outline) = match slot {
            Some(glyph) => (glyph.name.clone(), glyph.advance_width, &glyph.outline),
            None if gid == 0 => (NOTDEF.to_owned(), upem, &empty),
            None => {
                log::debug!("filling unused glyph id {gid}");
                (format!(".gap{gid}"), 0, &empty)
            }
        };
        let simple = SimpleGlyph::from_bezpath(outline).map_err(|e| Error::MalformedOutline {
            glyph: name.clone(),
            reason: format!("{e:?}"),
        })?;
        glyf_loca
            .add_glyph(&simple)
            .map_err(|e| Error::MalformedOutline {
                glyph: name.clone(),
                reason: e.to_string(),
            })?;
        let side_bearing = if simple.contours.is_empty() {
            0
        } else {
            simple.bbox.x_min
        };
        h_metrics.push(LongMetric {
            advance,
            side_bearing,
        });
        extents.add(&simple, advance);
        names.push(name);
    }
    let (glyf, loca, loca_format) = glyf_loca.build();

    let cmap = Cmap::from_mappings(table.glyphs.iter().filter_map(|glyph| {
        glyph
            .code_point
            .map(|c| (c, GlyphId::from(glyph.id)))
    }))?;

    let bbox = extents.bbox.unwrap_or_default();
    let head = Head {
        font_revision: info.revision(),
        units_per_em: upem,
        x_min: bbox.x_min,
        y_min: bbox.y_min,
        x_max: bbox.x_max,
        y_max: bbox.y_max,
        lowest_rec_ppem: table.metrics.pixels_per_em,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };
    let ascender = upem.min(i16::MAX as u16) as i16;
    let hhea = Hhea {
        ascender: FWord::new(ascender),
        descender: FWord::new(0),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(extents.advance_max),
        min_left_side_bearing: FWord::new(extents.min_lsb.unwrap_or_default()),
        min_right_side_bearing: FWord::new(extents.min_rsb.unwrap_or_default()),
        x_max_extent: FWord::new(extents.x_max_extent.unwrap_or_default()),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };
    let maxp = Maxp {
        num_glyphs,
        max_points: Some(extents.max_points),
        max_contours: Some(extents.max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };
    let os2 = os2_table(table, ascender);
    let hmtx = Hmtx {
        h_metrics,
        left_side_bearings: Vec::new(),
    };
    let post = Post::new_v2(names.iter().map(String::as_str));
    let name = info.name_table();
    let gsub = compile_gsub(&table.ligatures, &table.alternates, &table.contextual);

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)
        .and_then(|b| b.add_table(&hhea))
        .and_then(|b| b.add_table(&maxp))
        .and_then(|b| b.add_table(&os2))
        .and_then(|b| b.add_table(&hmtx))
        .and_then(|b| b.add_table(&cmap))
        .and_then(|b| b.add_table(&name))
        .and_then(|b| b.add_table(&post))
        .and_then(|b| b.add_table(&loca))
        .and_then(|b| b.add_table(&glyf))
        .map_err(|e| Error::ValidationFailure(e.to_string()))?;
    if let Some(gsub) = &gsub {
        builder
            .add_table(gsub)
            .map_err(|e| Error::ValidationFailure(e.to_string()))?;
    }
    let data = builder.build();
    check_font(&data, num_glyphs, gsub.is_some())?;
    log::debug!("assembled {num_glyphs} glyphs into {} bytes", data.len());
    Ok(data)
}

fn os2_table(table: &GlyphTable, ascender: i16) -> Os2 {
    let upem = table.metrics.units_per_em;
    let advances: Vec<u32> = table
        .glyphs
        .iter()
        .map(|glyph| glyph.advance_width as u32)
        .filter(|advance| *advance > 0)
        .chain(std::iter::once(upem as u32))
        .collect();
    let avg = advances.iter().sum::<u32>() / advances.len() as u32;
    let code_points = || {
        table
            .glyphs
            .iter()
            .filter_map(|glyph| glyph.code_point)
            .map(|c| (c as u32).min(0xFFFF) as u16)
    };
    Os2 {
        x_avg_char_width: avg.min(i16::MAX as u32) as i16,
        us_weight_class: 400,
        us_width_class: 5,
        s_typo_ascender: ascender,
        s_typo_line_gap: 0,
        us_win_ascent: upem,
        us_win_descent: 0,
        us_first_char_index: code_points().min().unwrap_or_default(),
        us_last_char_index: code_points().max().unwrap_or_default(),
        ..Default::default()
    }
}

/// Parse the compiled font back and check that the essentials are readable.
fn check_font(data: &[u8], num_glyphs: u16, has_gsub: bool) -> Result<(), Error> {
    let invalid = |e: write_fonts::read::ReadError| Error::ValidationFailure(e.to_string());
    let font = FontRef::new(data).map_err(invalid)?;
    let found = font.maxp().map_err(invalid)?.num_glyphs();
    if found != num_glyphs {
        return Err(Error::ValidationFailure(format!(
            "expected {num_glyphs} glyphs, found {found}"
        )));
    }
    font.head().map_err(invalid)?;
    font.hhea().map_err(invalid)?;
    font.hmtx().map_err(invalid)?;
    font.cmap().map_err(invalid)?;
    font.post().map_err(invalid)?;
    font.glyf().map_err(invalid)?;
    if has_gsub {
        font.gsub().map_err(invalid)?.lookup_list().map_err(invalid)?;
    }
    Ok(())
}
