//! Capabilities the replay core drives.
//!
//! The modeling kernel and the export writer are external. Both are
//! single-owner, blocking, and have no internal concurrency guarantees, so
//! every mutating call takes `&mut self`.

use crate::artifact::ExportFormat;
use recast_core::{BodyId, CoreResult, FeatureId, LogId, ProfileRef, StepId, TimelineMarker};
use recast_log::{ExtrudeOperation, ExtrudeParameters};
use std::path::Path;

/// A single extrude to perform
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeRequest<'a> {
    /// Step being replayed
    pub step: &'a StepId,
    /// Zero-based step index
    pub index: usize,
    /// Extent and taper
    pub parameters: ExtrudeParameters,
    /// Boolean operation
    pub operation: ExtrudeOperation,
    /// Profiles to extrude
    pub profiles: &'a [ProfileRef],
    /// True for the throwaway re-execution on a fork branch
    pub alternate: bool,
}

/// Result of an extrude
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrudeResult {
    /// Feature created in the history
    pub feature: FeatureId,
    /// Bodies produced or modified by the feature
    pub bodies: Vec<BodyId>,
}

/// Live modeling session with a linear, rollback-able history
pub trait ModelingSession {
    /// Add a sketch to the history
    ///
    /// # Errors
    ///
    /// Returns error if the kernel rejects the sketch
    fn create_sketch(&mut self, id: &StepId, name: Option<&str>) -> CoreResult<()>;

    /// Register a closed profile inside an existing sketch
    ///
    /// # Errors
    ///
    /// Returns error if the sketch is unknown or the profile is rejected
    fn create_profile(&mut self, profile: &ProfileRef, sketch: &StepId) -> CoreResult<()>;

    /// Extrude profiles, appending one feature to the history
    ///
    /// # Errors
    ///
    /// Returns error if the kernel rejects the extrude
    fn extrude(&mut self, request: &ExtrudeRequest<'_>) -> CoreResult<ExtrudeResult>;

    /// Marker at the current end of the visible history
    fn marker(&self) -> TimelineMarker;

    /// Roll the history back so `marker` is the end of the visible history
    ///
    /// # Errors
    ///
    /// Returns error if the marker lies beyond the history
    fn roll_to(&mut self, marker: TimelineMarker) -> CoreResult<()>;

    /// Delete every history entry after the current roll position
    ///
    /// # Errors
    ///
    /// Returns error if the kernel refuses the deletion
    fn delete_all_after_marker(&mut self) -> CoreResult<()>;

    /// Number of history entries, including rolled-back ones not yet deleted
    fn history_len(&self) -> usize;

    /// Number of bodies visible at the current roll position
    fn body_count(&self) -> usize;
}

/// Writes bodies to files
pub trait ExportSink {
    /// Export `bodies` to `path` in `format`
    ///
    /// # Errors
    ///
    /// Returns error if the writer fails. Success does not guarantee the file
    /// exists; callers verify.
    fn export(&mut self, format: ExportFormat, path: &Path, bodies: &[BodyId]) -> CoreResult<()>;
}

/// Opens and closes the per-log document a session runs in
///
/// Every successfully opened session must be handed back to
/// [`DocumentHost::close_document`] exactly once.
pub trait DocumentHost {
    /// Session type of an open document
    type Session: ModelingSession;

    /// Open a fresh document for replaying `log`
    ///
    /// # Errors
    ///
    /// Returns error if the host cannot provide a document
    fn open_document(&mut self, log: &LogId) -> CoreResult<Self::Session>;

    /// Close a document without saving
    ///
    /// # Errors
    ///
    /// Returns error if the host refuses to close the document
    fn close_document(&mut self, session: Self::Session) -> CoreResult<()>;
}
