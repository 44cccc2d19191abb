//! Export artifacts and their deterministic names.

use recast_core::{CoreError, CoreResult, LogId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Geometry file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Parasolid-family B-rep text
    Smt,
    /// Wavefront mesh
    Obj,
    /// ISO 10303 B-rep
    Step,
    /// Triangle mesh
    Stl,
}

impl ExportFormat {
    /// File extension, without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Smt => "smt",
            Self::Obj => "obj",
            Self::Step => "step",
            Self::Stl => "stl",
        }
    }

    /// The pair written at every fork point unless configured otherwise
    #[must_use]
    pub fn default_pair() -> Vec<Self> {
        vec![Self::Smt, Self::Obj]
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smt" => Ok(Self::Smt),
            "obj" => Ok(Self::Obj),
            "step" | "stp" => Ok(Self::Step),
            "stl" => Ok(Self::Stl),
            other => Err(CoreError::InvalidParameters {
                field: "format".to_string(),
                reason: format!("unsupported export format {}", other),
            }),
        }
    }
}

/// Files written for one fork point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    /// Index of the extrude the fork was taken at
    pub index: usize,
    /// One path per format, in export order
    pub files: Vec<(ExportFormat, PathBuf)>,
}

impl ExportArtifact {
    /// File name for one format: `{stem}_{index:04}e.{ext}`
    #[must_use]
    pub fn file_name(stem: &str, index: usize, format: ExportFormat) -> String {
        format!("{}_{:04}e.{}", stem, index, format.extension())
    }

    /// Plan the paths for a fork point without touching the filesystem
    #[must_use]
    pub fn plan(output_dir: &Path, log: &LogId, index: usize, formats: &[ExportFormat]) -> Self {
        let files = formats
            .iter()
            .map(|&format| {
                (
                    format,
                    output_dir.join(Self::file_name(log.stem(), index, format)),
                )
            })
            .collect();
        Self { index, files }
    }
}

/// Remove a file left at `path` by an earlier run
///
/// # Errors
///
/// Returns `Io` if an existing file cannot be removed
pub fn clear_stale(path: &Path) -> CoreResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed stale artifact");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::io(path, &e)),
    }
}

/// Check a single exported file exists
///
/// # Errors
///
/// Returns `ArtifactMissing` if `path` is not a file
pub fn verify_file(path: &Path) -> CoreResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CoreError::ArtifactMissing {
            path: path.display().to_string(),
        })
    }
}
