//! Failure traces.
//!
//! A trace is the ordered list of frames a failure crossed on its way to the
//! batch driver, innermost first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered propagation frames of a failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    frames: Vec<String>,
}

impl Trace {
    /// Create an empty trace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outer frame
    pub fn push(&mut self, frame: impl Into<String>) {
        self.frames.push(frame.into());
    }

    /// Append an outer frame, builder style
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.push(frame);
        self
    }

    /// Frames, innermost first
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Check if the trace has no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  at {}", frame)?;
        }
        Ok(())
    }
}
