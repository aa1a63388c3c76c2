//! Running an external command over the written font.

use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use serde::Deserialize;

/// An external command run once the font has been written.
///
/// The path of the font is appended as the last argument.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostProcess {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// The post-processing step failed.
///
/// The font has already been written when this happens, so it is reported
/// rather than treated as a build failure.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status} while processing '{}'", artifact.display())]
    Failed {
        program: String,
        artifact: PathBuf,
        status: ExitStatus,
    },
}

impl PostProcess {
    /// Run the command over `artifact`, waiting for it to finish.
    pub fn run(&self, artifact: &Path) -> Result<(), PostProcessError> {
        log::info!("post-processing '{}' with {}", artifact.display(), self.program);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(artifact)
            .output()
            .map_err(|source| PostProcessError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            log::info!("{}: {line}", self.program);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            log::warn!("{}: {line}", self.program);
        }
        if !output.status.success() {
            return Err(PostProcessError::Failed {
                program: self.program.clone(),
                artifact: artifact.to_owned(),
                status: output.status,
            });
        }
        Ok(())
    }
}
