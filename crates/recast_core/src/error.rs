//! Core error types for recast.
//!
//! Every failure is constructed deliberately at its failure site with an
//! explicit category. [`CoreError::kind`] is the name recorded in the result
//! store; [`CoreError::message`] is the human-readable detail.

use std::fmt;
use std::path::Path;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The modeling kernel rejected a construction step
    StepFailed { step: String, reason: String },

    /// Step parameters are unusable
    InvalidParameters { field: String, reason: String },

    /// A step referenced a profile the session does not know
    UnknownProfile { profile: String },

    /// A step referenced a sketch the session does not know
    UnknownSketch { sketch: String },

    /// An export reported success but the artifact is not on disk
    ArtifactMissing { path: String },

    /// The export sink failed to write an artifact
    Export { format: String, reason: String },

    /// Rolling the session history back failed
    Rollback { marker: usize, reason: String },

    /// Generic session (document) failure
    Session { operation: String, reason: String },

    /// Parse error
    Parse { message: String },

    /// Filesystem error
    Io { path: String, reason: String },

    /// The readiness registry already fired
    RegistrySpent,

    /// Internal error (for unexpected errors)
    Internal {
        /// Error message
        message: String,
    },
}

impl CoreError {
    /// Build an I/O error for `path`
    #[must_use]
    pub fn io(path: impl AsRef<Path>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Categorical name of the failure
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StepFailed { .. } => "StepFailed",
            Self::InvalidParameters { .. } => "InvalidParameters",
            Self::UnknownProfile { .. } => "UnknownProfile",
            Self::UnknownSketch { .. } => "UnknownSketch",
            Self::ArtifactMissing { .. } => "ArtifactMissing",
            Self::Export { .. } => "ExportFailed",
            Self::Rollback { .. } => "RollbackFailed",
            Self::Session { .. } => "SessionError",
            Self::Parse { .. } => "ParseError",
            Self::Io { .. } => "IoError",
            Self::RegistrySpent => "RegistrySpent",
            Self::Internal { .. } => "InternalError",
        }
    }

    /// Descriptive arguments of the failure, joined by a single space
    #[must_use]
    pub fn message(&self) -> String {
        let args: Vec<String> = match self {
            Self::StepFailed { step, reason } => vec![step.clone(), reason.clone()],
            Self::InvalidParameters { field, reason } => vec![field.clone(), reason.clone()],
            Self::UnknownProfile { profile } => vec![profile.clone()],
            Self::UnknownSketch { sketch } => vec![sketch.clone()],
            Self::ArtifactMissing { path } => vec![path.clone()],
            Self::Export { format, reason } => vec![format.clone(), reason.clone()],
            Self::Rollback { marker, reason } => vec![marker.to_string(), reason.clone()],
            Self::Session { operation, reason } => vec![operation.clone(), reason.clone()],
            Self::Parse { message } => vec![message.clone()],
            Self::Io { path, reason } => vec![path.clone(), reason.clone()],
            Self::RegistrySpent => Vec::new(),
            Self::Internal { message } => vec![message.clone()],
        };
        args.join(" ")
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepFailed { step, reason } => write!(f, "Step {} failed: {}", step, reason),
            Self::InvalidParameters { field, reason } => {
                write!(f, "Invalid parameter {}: {}", field, reason)
            }
            Self::UnknownProfile { profile } => write!(f, "Unknown profile: {}", profile),
            Self::UnknownSketch { sketch } => write!(f, "Unknown sketch: {}", sketch),
            Self::ArtifactMissing { path } => write!(f, "Export artifact missing: {}", path),
            Self::Export { format, reason } => write!(f, "Export to {} failed: {}", format, reason),
            Self::Rollback { marker, reason } => {
                write!(f, "Rollback to marker {} failed: {}", marker, reason)
            }
            Self::Session { operation, reason } => {
                write!(f, "Session {} failed: {}", operation, reason)
            }
            Self::Parse { message } => write!(f, "Parse error: {}", message),
            Self::Io { path, reason } => write!(f, "IO error at {}: {}", path, reason),
            Self::RegistrySpent => write!(f, "Readiness registry already fired"),
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}
