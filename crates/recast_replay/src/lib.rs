//! recast Replay Engine
//!
//! Sequential replay of construction logs against a modeling session, with a
//! synchronous hook after every extrude. The fork exporter hook branches the
//! history, exports the branch, and rolls it back.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod engine;
pub mod fork;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{ExportArtifact, ExportFormat};
pub use engine::{
    ExtrudeOutcome, ReplayConfig, ReplayEngine, ReplayFailure, ReplaySummary, StepHook,
};
pub use fork::{ForkConfig, ForkExporter};
pub use session::{DocumentHost, ExportSink, ExtrudeRequest, ExtrudeResult, ModelingSession};
