//! Identifiers for recast entities.
//!
//! Log identifiers come from file names. Step and profile identifiers come
//! from the construction log itself. Body and feature handles are issued by
//! the modeling session.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log identifier - the source file name plus its stem
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId {
    name: String,
    stem: String,
}

impl LogId {
    /// Create from a file name such as `Hexagon.json`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Self {
            name: name.to_string(),
            stem,
        }
    }

    /// Create from the path of a construction log file
    ///
    /// # Errors
    ///
    /// Returns error if the path has no file name
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let name = path.file_name().ok_or_else(|| CoreError::InvalidParameters {
            field: "log path".to_string(),
            reason: format!("{} has no file name", path.display()),
        })?;
        Ok(Self::from_name(&name.to_string_lossy()))
    }

    /// File name, used as the result store key
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File stem, used as the artifact prefix
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Step identifier - unique id of a step inside its log
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Create a new StepId
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile reference - names a closed profile consumed by an extrude
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRef(String);

impl ProfileRef {
    /// Create a new ProfileRef
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body handle issued by a modeling session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(u64);

impl BodyId {
    /// Create from raw value
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get raw value
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body_{}", self.0)
    }
}

/// Feature handle issued by a modeling session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(u64);

impl FeatureId {
    /// Create from raw value
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get raw value
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feature_{}", self.0)
    }
}

/// Position in a session's history
///
/// A marker at `n` means "after the first `n` history entries".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineMarker(usize);

impl TimelineMarker {
    /// Create from a history position
    #[must_use]
    pub const fn at(position: usize) -> Self {
        Self(position)
    }

    /// History position
    #[must_use]
    pub const fn position(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TimelineMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker@{}", self.0)
    }
}
