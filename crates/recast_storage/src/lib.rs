//! recast Storage
//!
//! The result store: a durable map from construction log file name to its
//! processing outcome. It is the only state shared between batch runs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod result;
pub mod store;

pub use result::{ProcessingResult, StoreCounts};
pub use store::{ResultStore, StoreError};
