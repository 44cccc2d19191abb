//! Processing outcomes and their on-disk record shape.

use recast_core::{CoreError, Trace};
use serde::{Deserialize, Serialize};

/// Outcome of processing one construction log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResultRecord", into = "ResultRecord")]
pub enum ProcessingResult {
    /// Selected for processing, outcome not yet recorded
    Pending,
    /// Replayed and exported every fork point
    Success,
    /// Replay failed
    Exception {
        /// Categorical name of the failure
        kind: String,
        /// Descriptive arguments of the failure
        message: String,
        /// Propagation trace
        trace: String,
    },
}

impl ProcessingResult {
    /// Build an exception outcome from a failure and its trace
    #[must_use]
    pub fn from_failure(error: &CoreError, trace: &Trace) -> Self {
        Self::Exception {
            kind: error.kind().to_string(),
            message: error.message(),
            trace: if trace.is_empty() {
                error.to_string()
            } else {
                format!("{}\n{}", error, trace)
            },
        }
    }

    /// Status label as stored on disk
    #[must_use]
    pub const fn status(&self) -> Option<&'static str> {
        match self {
            Self::Pending => None,
            Self::Success => Some("Success"),
            Self::Exception { .. } => Some("Exception"),
        }
    }

    /// Check if this is a success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Status {
    Success,
    Exception,
}

/// On-disk shape: `{}`, `{"status": "Success"}`, or
/// `{"status": "Exception", "exception", "exception_args", "trace"}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
}

impl From<ResultRecord> for ProcessingResult {
    fn from(record: ResultRecord) -> Self {
        match record.status {
            None => Self::Pending,
            Some(Status::Success) => Self::Success,
            Some(Status::Exception) => Self::Exception {
                kind: record.exception.unwrap_or_default(),
                message: record.exception_args.unwrap_or_default(),
                trace: record.trace.unwrap_or_default(),
            },
        }
    }
}

impl From<ProcessingResult> for ResultRecord {
    fn from(result: ProcessingResult) -> Self {
        match result {
            ProcessingResult::Pending => Self::default(),
            ProcessingResult::Success => Self {
                status: Some(Status::Success),
                ..Self::default()
            },
            ProcessingResult::Exception {
                kind,
                message,
                trace,
            } => Self {
                status: Some(Status::Exception),
                exception: Some(kind),
                exception_args: Some(message),
                trace: Some(trace),
            },
        }
    }
}

/// Entry counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    /// Placeholder entries
    pub pending: usize,
    /// Successful entries
    pub success: usize,
    /// Failed entries
    pub exception: usize,
}

impl StoreCounts {
    /// Total entries
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.success + self.exception
    }
}
