//! recast Runtime
//!
//! The resumable batch driver, log discovery, the per-log document guard, and
//! the host readiness registry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod discovery;
pub mod document;
pub mod driver;
pub mod host;

pub use config::{BatchConfig, DEFAULT_RESULTS_FILE};
pub use discovery::{discover_logs, DEFAULT_PATTERN};
pub use document::DocumentGuard;
pub use driver::{BatchDriver, BatchReport};
pub use host::{Launch, ReadinessRegistry, SubscriptionId};
