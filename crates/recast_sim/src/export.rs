//! File export sink for the simulated kernel.

use recast_core::{BodyId, CoreError, CoreResult};
use recast_replay::{ExportFormat, ExportSink};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Writes a small text file per export
///
/// Formats listed as dropped report success without writing anything, which
/// is how a misbehaving exporter looks to the caller.
#[derive(Debug, Default)]
pub struct FsExportSink {
    dropped: HashSet<ExportFormat>,
    written: Vec<PathBuf>,
}

impl FsExportSink {
    /// Create a sink that writes every format
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Silently skip writing `format`
    #[must_use]
    pub fn dropping(mut self, format: ExportFormat) -> Self {
        self.dropped.insert(format);
        self
    }

    /// Files written so far
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn render(format: ExportFormat, bodies: &[BodyId]) -> String {
    let mut out = String::new();
    match format {
        ExportFormat::Obj => {
            out.push_str("# recast simulated export\n");
            for body in bodies {
                let _ = writeln!(out, "o {}", body);
            }
        }
        ExportFormat::Stl => {
            for body in bodies {
                let _ = writeln!(out, "solid {}\nendsolid {}", body, body);
            }
        }
        ExportFormat::Smt | ExportFormat::Step => {
            let _ = writeln!(
                out,
                "RECAST-SIM {} {}",
                format.extension().to_uppercase(),
                bodies.len()
            );
            for body in bodies {
                let _ = writeln!(out, "{}", body);
            }
        }
    }
    out
}

impl ExportSink for FsExportSink {
    fn export(&mut self, format: ExportFormat, path: &Path, bodies: &[BodyId]) -> CoreResult<()> {
        if self.dropped.contains(&format) {
            tracing::debug!(path = %path.display(), "Dropping export");
            return Ok(());
        }
        std::fs::write(path, render(format, bodies)).map_err(|e| CoreError::Export {
            format: format.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        self.written.push(path.to_path_buf());
        Ok(())
    }
}
