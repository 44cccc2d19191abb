//! Fork exporter.
//!
//! After each primary extrude the exporter re-runs the extrude as a new body
//! on a throwaway branch, writes that body to every configured format,
//! verifies the files, and discards the branch. The session's visible history
//! is identical before and after the call.

use crate::artifact::{clear_stale, verify_file, ExportArtifact, ExportFormat};
use crate::engine::{ExtrudeOutcome, StepHook};
use crate::session::{ExportSink, ModelingSession};
use recast_core::{CoreError, CoreResult, TimelineMarker};
use recast_log::ExtrudeOperation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fork exporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkConfig {
    /// Directory artifacts are written into
    pub output_dir: PathBuf,
    /// Formats written at every fork point, in order
    pub formats: Vec<ExportFormat>,
}

impl ForkConfig {
    /// Create a config writing the default format pair into `output_dir`
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            formats: ExportFormat::default_pair(),
        }
    }

    /// Set formats
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }
}

/// Step hook that exports a forked branch at every extrude
pub struct ForkExporter<'a> {
    config: ForkConfig,
    sink: &'a mut dyn ExportSink,
    artifacts: Vec<ExportArtifact>,
}

impl<'a> ForkExporter<'a> {
    /// Create a new fork exporter writing through `sink`
    #[must_use]
    pub fn new(config: ForkConfig, sink: &'a mut dyn ExportSink) -> Self {
        Self {
            config,
            sink,
            artifacts: Vec::new(),
        }
    }

    /// Artifacts exported so far, one per fork point
    #[must_use]
    pub fn artifacts(&self) -> &[ExportArtifact] {
        &self.artifacts
    }

    /// Consume the exporter, returning its artifacts
    #[must_use]
    pub fn into_artifacts(self) -> Vec<ExportArtifact> {
        self.artifacts
    }

    fn fork_and_export(
        &mut self,
        session: &mut dyn ModelingSession,
        outcome: &ExtrudeOutcome<'_>,
    ) -> CoreResult<ExportArtifact> {
        // New body keeps the forked geometry separate from the primary result
        let request = outcome.alternate_request(ExtrudeOperation::NewBody);
        let alternate = session.extrude(&request)?;

        let artifact = ExportArtifact::plan(
            &self.config.output_dir,
            outcome.log,
            outcome.index,
            &self.config.formats,
        );
        for (format, path) in &artifact.files {
            // A file from an earlier run must not satisfy the check below
            clear_stale(path)?;
            self.sink.export(*format, path, &alternate.bodies)?;
            verify_file(path)?;
        }

        tracing::debug!(
            log = %outcome.log,
            index = outcome.index,
            bodies = alternate.bodies.len(),
            "Exported fork"
        );
        Ok(artifact)
    }
}

/// Roll back to `marker` and drop everything after it
fn discard_branch(session: &mut dyn ModelingSession, marker: TimelineMarker) -> CoreResult<()> {
    session.roll_to(marker)?;
    session.delete_all_after_marker()?;

    let len = session.history_len();
    if len != marker.position() {
        return Err(CoreError::Rollback {
            marker: marker.position(),
            reason: format!("history has {} entries after deletion", len),
        });
    }
    Ok(())
}

impl StepHook for ForkExporter<'_> {
    fn on_extrude(
        &mut self,
        session: &mut dyn ModelingSession,
        outcome: &ExtrudeOutcome<'_>,
    ) -> CoreResult<()> {
        let exported = self.fork_and_export(session, outcome);
        let discarded = discard_branch(session, outcome.marker);

        match (exported, discarded) {
            (Ok(artifact), Ok(())) => {
                self.artifacts.push(artifact);
                Ok(())
            }
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(rollback)) => {
                tracing::warn!(
                    log = %outcome.log,
                    index = outcome.index,
                    error = %rollback,
                    "Rollback failed after a failed fork export"
                );
                Err(err)
            }
        }
    }
}
