//! The build plan: what to compile and where to put it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    assemble::FontInfo, cartouche::CartoucheConfig, error::Error, layout::UnresolvedPolicy,
    outline::Metrics, postprocess::PostProcess, sheet::SheetOptions,
};

/// A build plan, usually read from a `plan.toml`.
///
/// Relative paths are resolved against the directory of the plan file by
/// [`BuildPlan::load`] and [`BuildPlan::from_toml`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildPlan {
    /// The family name; also the stem of the output file.
    pub family: String,
    pub style: String,
    pub version: String,
    #[serde(default)]
    pub designer: Option<String>,
    /// The glyph overrides file.
    #[serde(default)]
    pub metadata: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub metrics: Metrics,
    /// Sprite sheets, merged in order.
    #[serde(default)]
    pub sheets: Vec<SheetSource>,
    #[serde(default)]
    pub cartouche: CartoucheConfig,
    #[serde(default)]
    pub substitutions: SubstitutionOptions,
    #[serde(default)]
    pub postprocess: Option<PostProcess>,
}

/// One sprite sheet and how to merge it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetSource {
    pub path: PathBuf,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub auto_code_point: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstitutionOptions {
    pub unresolved: UnresolvedPolicy,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl BuildPlan {
    /// Read the plan at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(path, &text)
    }

    /// Parse a plan from TOML text, as if it had been read from `path`.
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, Error> {
        let mut plan: BuildPlan = toml::from_str(text).map_err(|e| Error::parse(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        plan.resolve_paths(base);
        Ok(plan)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(metadata) = self.metadata.as_mut() {
            resolve(metadata);
        }
        resolve(&mut self.output_dir);
        for sheet in &mut self.sheets {
            resolve(&mut sheet.path);
        }
    }

    pub fn font_info(&self) -> FontInfo {
        FontInfo {
            family: self.family.clone(),
            style: self.style.clone(),
            version: self.version.clone(),
            designer: self.designer.clone(),
        }
    }

    /// The path the compiled font is written to.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.ttf", self.family))
    }
}

impl SheetSource {
    pub fn options(&self) -> SheetOptions {
        SheetOptions {
            prefix: self.prefix.clone(),
            auto_code_point: self.auto_code_point,
        }
    }
}
