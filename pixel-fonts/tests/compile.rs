//! Compile the sample project and read the font back.

use std::collections::BTreeSet;

use pixel_fonts::{outline::Metrics, BuildPlan, CompiledFont, FontProject};
use pretty_assertions::assert_eq;
use skrifa::{
    outline::{DrawSettings, OutlinePen},
    prelude::{LocationRef, Size},
    raw::{
        types::{GlyphId16, Tag},
        FontRef, TableProvider,
    },
    GlyphId, MetadataProvider,
};

fn project() -> FontProject {
    let _ = env_logger::builder().is_test(true).try_init();
    FontProject::load(&pixel_test_data::plan_path()).unwrap()
}

fn compiled() -> (FontProject, CompiledFont) {
    let mut project = project();
    let compiled = project.compile().unwrap().clone();
    (project, compiled)
}

/// Collects the points of every contour; all segments are straight.
#[derive(Default)]
struct Contours(Vec<Vec<(f32, f32)>>);

impl OutlinePen for Contours {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if let Some(contour) = self.0.last_mut() {
            contour.push((x, y));
        }
    }

    fn quad_to(&mut self, _cx0: f32, _cy0: f32, x: f32, y: f32) {
        self.line_to(x, y);
    }

    fn curve_to(&mut self, _cx0: f32, _cy0: f32, _cx1: f32, _cy1: f32, x: f32, y: f32) {
        self.line_to(x, y);
    }

    fn close(&mut self) {}
}

impl Contours {
    /// Nonzero winding number at (x, y).
    fn contains(&self, x: f32, y: f32) -> bool {
        let mut winding = 0;
        for contour in &self.0 {
            for (i, &(x0, y0)) in contour.iter().enumerate() {
                let (x1, y1) = contour[(i + 1) % contour.len()];
                let side = (x1 - x0) * (y - y0) - (x - x0) * (y1 - y0);
                if y0 <= y && y1 > y && side > 0.0 {
                    winding += 1;
                } else if y0 > y && y1 <= y && side < 0.0 {
                    winding -= 1;
                }
            }
        }
        winding != 0
    }

    /// Sample the center of every grid cell near the em box.
    fn cells(&self, metrics: &Metrics) -> BTreeSet<(i32, i32)> {
        let scale = metrics.scale() as f32;
        let span = metrics.pixels_per_em as i32 + 2;
        let mut cells = BTreeSet::new();
        for y in -2..span {
            for x in -2..span {
                let (left, bottom) = metrics.cell_origin(x, y);
                let center_x = (left as f32 + 0.5) * scale;
                let center_y = (bottom as f32 + 0.5) * scale;
                if self.contains(center_x, center_y) {
                    cells.insert((x, y));
                }
            }
        }
        cells
    }
}

#[test]
fn glyph_ids_and_names() {
    let (_, compiled) = compiled();
    let font = FontRef::new(&compiled.data).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 17);
    let post = font.post().unwrap();
    let names: Vec<_> = (0..17u16)
        .map(|gid| post.glyph_name(GlyphId16::new(gid)).unwrap_or_default())
        .collect();
    assert_eq!(
        names,
        [
            ".notdef",
            "space",
            "space.cart",
            "^",
            "tp.startcart",
            "tp.endcart",
            "tp.an",
            "a",
            "n",
            "[",
            "]",
            "tp.la",
            "l",
            "tp.startcart.cart",
            "tp.endcart.cart",
            "tp.an.cart",
            "tp.la.cart",
        ]
    );
}

#[test]
fn charmap() {
    let (_, compiled) = compiled();
    let font = FontRef::new(&compiled.data).unwrap();
    let charmap = font.charmap();
    assert_eq!(charmap.map(' '), Some(GlyphId::new(1)));
    assert_eq!(charmap.map('a'), Some(GlyphId::new(7)));
    assert_eq!(charmap.map('l'), Some(GlyphId::new(12)));
    assert_eq!(charmap.map('['), Some(GlyphId::new(9)));
    // word glyphs are reached through ligatures only
    assert_eq!(charmap.map('t'), None);
}

#[test]
fn advances() {
    let (_, compiled) = compiled();
    let font = FontRef::new(&compiled.data).unwrap();
    let metrics = font.glyph_metrics(Size::unscaled(), LocationRef::default());
    assert_eq!(metrics.advance_width(GlyphId::new(0)), Some(1024.0));
    assert_eq!(metrics.advance_width(GlyphId::new(3)), Some(0.0));
    assert_eq!(metrics.advance_width(GlyphId::new(7)), Some(1024.0));
    assert_eq!(metrics.advance_width(GlyphId::new(15)), Some(1024.0));
}

#[test]
fn outlines_round_trip() {
    let (project, compiled) = compiled();
    let font = FontRef::new(&compiled.data).unwrap();
    let outlines = font.outline_glyphs();
    let metrics = project.plan().metrics;
    let store = project.glyph_store().unwrap();

    let mut checked = 0;
    for glyph in store.iter() {
        let Some(bitmap) = &glyph.bitmap else {
            continue;
        };
        let id = compiled.table.get(&glyph.key).unwrap().id;
        let mut pen = Contours::default();
        outlines
            .get(GlyphId::new(id.to_u16() as u32))
            .unwrap()
            .draw(
                DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                &mut pen,
            )
            .unwrap();
        let expected: BTreeSet<_> = bitmap
            .filled()
            .map(|(x, y)| (x as i32 + bitmap.offset_x(), y as i32 + bitmap.offset_y()))
            .collect();
        assert_eq!(pen.cells(&metrics), expected, "glyph '{}'", glyph.key);
        checked += 1;
    }
    assert!(checked > 10);
}

#[test]
fn substitution_features() {
    let (_, compiled) = compiled();
    let font = FontRef::new(&compiled.data).unwrap();
    let gsub = font.gsub().unwrap();
    let tags: Vec<_> = gsub
        .feature_list()
        .unwrap()
        .feature_records()
        .iter()
        .map(|record| record.feature_tag())
        .collect();
    assert_eq!(
        tags,
        [Tag::new(b"calt"), Tag::new(b"liga"), Tag::new(b"salt")]
    );
    assert_eq!(gsub.lookup_list().unwrap().lookup_count(), 3);
}

#[test]
fn build_writes_the_font() {
    let dir = tempfile::tempdir().unwrap();
    let mut plan = BuildPlan::load(&pixel_test_data::plan_path()).unwrap();
    plan.output_dir = dir.path().join("out");
    let mut project = FontProject::new(plan).unwrap();
    let path = project.build(false).unwrap();
    assert_eq!(path, dir.path().join("out").join("sample pixel.ttf"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, project.compile().unwrap().data);
}

#[cfg(unix)]
#[test]
fn failing_postprocess_keeps_the_font() {
    let dir = tempfile::tempdir().unwrap();
    let mut plan = BuildPlan::load(&pixel_test_data::plan_path()).unwrap();
    plan.output_dir = dir.path().to_owned();
    plan.postprocess = Some(pixel_fonts::postprocess::PostProcess {
        program: "false".into(),
        args: Vec::new(),
    });
    let path = FontProject::new(plan).unwrap().build(true).unwrap();
    assert!(path.exists());
}

#[test]
fn binary() {
    let dir = tempfile::tempdir().unwrap();
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_pixel-fonts"))
        .arg(pixel_test_data::plan_path())
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--strict")
        .arg("--no-postprocess")
        .status()
        .unwrap();
    assert!(status.success());
    let data = std::fs::read(dir.path().join("sample pixel.ttf")).unwrap();
    assert_eq!(FontRef::new(&data).unwrap().maxp().unwrap().num_glyphs(), 17);

    let missing = std::process::Command::new(env!("CARGO_BIN_EXE_pixel-fonts"))
        .arg(dir.path().join("no-such-plan.toml"))
        .status()
        .unwrap();
    assert_eq!(missing.code(), Some(1));
}
