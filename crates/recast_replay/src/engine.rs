//! Replay engine for construction logs.

use crate::session::{ExtrudeRequest, ExtrudeResult, ModelingSession};
use recast_core::{CoreError, CoreResult, LogId, ProfileRef, StepId, TimelineMarker, Trace};
use recast_log::{ConstructionLog, ExtrudeOperation, ExtrudeParameters, Step};
use serde::{Deserialize, Serialize};

/// Replay engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Treat a log with no steps as a failure
    pub fail_on_empty_log: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            fail_on_empty_log: false,
        }
    }
}

/// A failed replay: the error raised plus the frames it crossed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct ReplayFailure {
    /// The error raised at the failure site
    pub error: CoreError,
    /// Propagation frames, innermost first
    pub trace: Trace,
}

impl ReplayFailure {
    /// Wrap an error with its first frame
    #[must_use]
    pub fn new(error: CoreError, frame: impl Into<String>) -> Self {
        Self {
            error,
            trace: Trace::new().with_frame(frame),
        }
    }

    /// Add an outer frame
    #[must_use]
    pub fn within(mut self, frame: impl Into<String>) -> Self {
        self.trace.push(frame);
        self
    }
}

/// Payload handed to the hook after a primary extrude
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeOutcome<'a> {
    /// Log being replayed
    pub log: &'a LogId,
    /// Extrude step id
    pub step: &'a StepId,
    /// Zero-based step index
    pub index: usize,
    /// Parameters of the primary extrude
    pub parameters: ExtrudeParameters,
    /// Operation of the primary extrude
    pub operation: ExtrudeOperation,
    /// Profiles the extrude consumed
    pub profiles: &'a [ProfileRef],
    /// Feature and bodies produced by the primary extrude
    pub result: ExtrudeResult,
    /// End of the history right after the primary extrude
    pub marker: TimelineMarker,
}

impl ExtrudeOutcome<'_> {
    /// Request that re-executes this extrude with another operation
    #[must_use]
    pub fn alternate_request(&self, operation: ExtrudeOperation) -> ExtrudeRequest<'_> {
        ExtrudeRequest {
            step: self.step,
            index: self.index,
            parameters: self.parameters,
            operation,
            profiles: self.profiles,
            alternate: true,
        }
    }
}

/// Synchronous capability invoked after every extrude
///
/// Replay does not advance until the hook returns. An error aborts the log.
pub trait StepHook {
    /// Called once per extrude, after the primary operation
    ///
    /// # Errors
    ///
    /// Any error stops replay of the current log
    fn on_extrude(
        &mut self,
        session: &mut dyn ModelingSession,
        outcome: &ExtrudeOutcome<'_>,
    ) -> CoreResult<()>;
}

impl<F> StepHook for F
where
    F: FnMut(&mut dyn ModelingSession, &ExtrudeOutcome<'_>) -> CoreResult<()>,
{
    fn on_extrude(
        &mut self,
        session: &mut dyn ModelingSession,
        outcome: &ExtrudeOutcome<'_>,
    ) -> CoreResult<()> {
        self(session, outcome)
    }
}

/// Counts from a completed replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    /// Steps replayed
    pub steps: usize,
    /// Extrude steps replayed (and hooks invoked)
    pub extrudes: usize,
}

/// Replay engine for reconstructing designs from construction logs
#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    config: ReplayConfig,
}

impl ReplayEngine {
    /// Create a new replay engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Replay every step of `log` in order, calling `hook` after each extrude
    ///
    /// # Errors
    ///
    /// Returns the first step or hook failure; steps after it are not replayed
    pub fn reconstruct(
        &self,
        session: &mut dyn ModelingSession,
        log: &ConstructionLog,
        hook: &mut dyn StepHook,
    ) -> Result<ReplaySummary, ReplayFailure> {
        let log_frame = || format!("replay of {}", log.id());

        if log.is_empty() && self.config.fail_on_empty_log {
            return Err(ReplayFailure::new(
                CoreError::InvalidParameters {
                    field: "steps".to_string(),
                    reason: "construction log is empty".to_string(),
                },
                log_frame(),
            ));
        }

        let mut summary = ReplaySummary::default();
        for step in log.steps() {
            let step_frame =
                || format!("{} step {} ({})", step.kind_name(), step.index(), step.id());
            tracing::debug!(
                log = %log.id(),
                step = step.id(),
                kind = step.kind_name(),
                "Replaying step"
            );

            match step {
                Step::Sketch { id, name, .. } => session
                    .create_sketch(id, name.as_deref())
                    .map_err(|e| ReplayFailure::new(e, step_frame()).within(log_frame()))?,
                Step::Profile { id, sketch, .. } => session
                    .create_profile(id, sketch)
                    .map_err(|e| ReplayFailure::new(e, step_frame()).within(log_frame()))?,
                Step::Extrude {
                    id,
                    index,
                    parameters,
                    operation,
                    profiles,
                } => {
                    let request = ExtrudeRequest {
                        step: id,
                        index: *index,
                        parameters: *parameters,
                        operation: *operation,
                        profiles,
                        alternate: false,
                    };
                    let result = session
                        .extrude(&request)
                        .map_err(|e| ReplayFailure::new(e, step_frame()).within(log_frame()))?;

                    let outcome = ExtrudeOutcome {
                        log: log.id(),
                        step: id,
                        index: *index,
                        parameters: *parameters,
                        operation: *operation,
                        profiles,
                        result,
                        marker: session.marker(),
                    };
                    hook.on_extrude(session, &outcome).map_err(|e| {
                        ReplayFailure::new(e, format!("extrude hook at index {}", index))
                            .within(step_frame())
                            .within(log_frame())
                    })?;
                    summary.extrudes += 1;
                }
            }
            summary.steps += 1;
        }

        Ok(summary)
    }
}
