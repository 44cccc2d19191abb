//! recast Construction Logs
//!
//! Ordered, typed records of how a design was built. Logs are immutable once
//! read; only extrude steps are fork points.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reader;
pub mod step;

pub use reader::{ConstructionLogReader, JsonLogReader};
pub use step::{ConstructionLog, ExtrudeOperation, ExtrudeParameters, Step};
