//! recast Core Types
//!
//! Identifiers, the closed error taxonomy, and failure traces shared by
//! every other crate. No I/O lives here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod trace;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use id::{BodyId, FeatureId, LogId, ProfileRef, StepId, TimelineMarker};
pub use trace::Trace;
