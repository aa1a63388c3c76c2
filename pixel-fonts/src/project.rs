//! A font project: a build plan together with its loaded inputs.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;

use crate::{
    assemble::assemble,
    cartouche,
    error::Error,
    plan::BuildPlan,
    sheet::{SheetOptions, SpriteSheet},
    store::{GlyphStore, Metadata},
    table::{GlyphTable, GlyphTableBuilder},
};

/// The result of compiling a project.
#[derive(Clone, Debug)]
pub struct CompiledFont {
    pub table: GlyphTable,
    pub data: Vec<u8>,
}

/// Owns a plan and its inputs, and compiles them at most once.
#[derive(Debug)]
pub struct FontProject {
    plan: BuildPlan,
    metadata: Metadata,
    sheets: Vec<(SpriteSheet, SheetOptions)>,
    compiled: Option<CompiledFont>,
}

impl FontProject {
    /// Read the plan at `path` and everything it refers to.
    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::new(BuildPlan::load(path)?)
    }

    /// Read the inputs named by `plan`.
    ///
    /// The metadata and the sheets are read in parallel.
    pub fn new(plan: BuildPlan) -> Result<Self, Error> {
        let (metadata, sheets) = rayon::join(
            || match &plan.metadata {
                Some(path) => Metadata::load(path),
                None => Ok(Metadata::default()),
            },
            || {
                plan.sheets
                    .par_iter()
                    .map(|source| Ok((SpriteSheet::load(&source.path)?, source.options())))
                    .collect::<Result<Vec<_>, Error>>()
            },
        );
        Ok(FontProject {
            metadata: metadata?,
            sheets: sheets?,
            plan,
            compiled: None,
        })
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// The overrides merged with every sheet, plus synthesized cartouches.
    pub fn glyph_store(&self) -> Result<GlyphStore, Error> {
        let mut store = GlyphStore::from_metadata(&self.metadata)?;
        for (sheet, options) in &self.sheets {
            store.merge_layers(sheet.layers()?, options);
        }
        cartouche::synthesize(&store, &self.plan.cartouche)
    }

    pub fn glyph_table(&self) -> Result<GlyphTable, Error> {
        let store = self.glyph_store()?;
        GlyphTableBuilder::new(self.plan.metrics)
            .with_policy(self.plan.substitutions.unresolved)
            .with_cartouche(self.plan.cartouche.clone())
            .build(&store)
    }

    /// Compile the font, or return the result of an earlier compile.
    pub fn compile(&mut self) -> Result<&CompiledFont, Error> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => self.compile_uncached()?,
        };
        Ok(self.compiled.insert(compiled))
    }

    fn compile_uncached(&self) -> Result<CompiledFont, Error> {
        let start = Instant::now();
        let table = self.glyph_table()?;
        if !table.unresolved.is_empty() {
            log::warn!(
                "{} substitution keys could not be resolved",
                table.unresolved.len()
            );
        }
        let data = assemble(&table, &self.plan.font_info())?;
        log::info!(
            "generated {} glyphs in {:.2?}",
            table.num_glyphs(),
            start.elapsed()
        );
        Ok(CompiledFont { table, data })
    }

    /// Compile the font and write it to the plan's output directory.
    ///
    /// Returns the path of the written file.
    pub fn save(&mut self) -> Result<PathBuf, Error> {
        let path = self.plan.artifact_path();
        let output_dir = self.plan.output_dir.clone();
        let data = &self.compile()?.data;
        std::fs::create_dir_all(&output_dir).map_err(|e| Error::io(&output_dir, e))?;
        std::fs::write(&path, data).map_err(|e| Error::io(&path, e))?;
        log::info!("wrote {} bytes to '{}'", data.len(), path.display());
        Ok(path)
    }

    /// Save the font and run the post-processing command, if there is one
    /// and `postprocess` is set.
    ///
    /// A failing post-processing command is logged and does not fail the
    /// build.
    pub fn build(&mut self, postprocess: bool) -> Result<PathBuf, Error> {
        let start = Instant::now();
        let path = self.save()?;
        if let Some(command) = self.plan.postprocess.as_ref().filter(|_| postprocess) {
            let post_start = Instant::now();
            match command.run(&path) {
                Ok(()) => log::info!("post-processed in {:.2?}", post_start.elapsed()),
                Err(e) => log::error!("{e}"),
            }
        }
        log::info!("finished in {:.2?}", start.elapsed());
        Ok(path)
    }
}
