//! recast Deterministic Simulation
//!
//! An in-memory modeling kernel with a linear, rollback-able history, a host
//! that hands out one fresh kernel per document, and a file export sink.
//! Faults can be injected at chosen steps to exercise failure paths.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod export;
pub mod fault;
pub mod host;
pub mod kernel;

pub use export::FsExportSink;
pub use fault::{Fault, FaultPlan};
pub use host::{HostStats, SimHost};
pub use kernel::SimSession;
