//! Step types for construction logs.

use recast_core::{CoreError, CoreResult, LogId, ProfileRef, StepId};
use serde::{Deserialize, Serialize};

/// Boolean operation applied by an extrude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtrudeOperation {
    /// Create a new, independent body
    #[serde(rename = "NewBodyFeatureOperation")]
    NewBody,
    /// Merge into the existing body
    #[serde(rename = "JoinFeatureOperation")]
    Join,
    /// Subtract from the existing body
    #[serde(rename = "CutFeatureOperation")]
    Cut,
    /// Keep the overlap with the existing body
    #[serde(rename = "IntersectFeatureOperation")]
    Intersect,
    /// Create a new component holding a new body
    #[serde(rename = "NewComponentFeatureOperation")]
    NewComponent,
}

impl ExtrudeOperation {
    /// Whether the operation produces its own body
    #[must_use]
    pub const fn creates_body(self) -> bool {
        matches!(self, Self::NewBody | Self::NewComponent)
    }
}

/// Extent and taper of an extrude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeParameters {
    /// Distance along the profile normal
    pub extent_one: f64,
    /// Distance in the opposite direction, for two-sided extrudes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent_two: Option<f64>,
    /// Taper angle in radians
    #[serde(default)]
    pub taper_angle: f64,
}

impl ExtrudeParameters {
    /// One-sided extrude by `distance`
    #[must_use]
    pub const fn one_side(distance: f64) -> Self {
        Self {
            extent_one: distance,
            extent_two: None,
            taper_angle: 0.0,
        }
    }

    /// Check the parameters describe a real extrude
    ///
    /// # Errors
    ///
    /// Returns error on non-finite values or a zero first extent
    pub fn validate(&self) -> CoreResult<()> {
        if !self.extent_one.is_finite() || self.extent_one == 0.0 {
            return Err(CoreError::InvalidParameters {
                field: "extent_one".to_string(),
                reason: format!("must be finite and non-zero, got {}", self.extent_one),
            });
        }
        if let Some(two) = self.extent_two {
            if !two.is_finite() {
                return Err(CoreError::InvalidParameters {
                    field: "extent_two".to_string(),
                    reason: format!("must be finite, got {}", two),
                });
            }
        }
        if !self.taper_angle.is_finite() {
            return Err(CoreError::InvalidParameters {
                field: "taper_angle".to_string(),
                reason: format!("must be finite, got {}", self.taper_angle),
            });
        }
        Ok(())
    }
}

/// A single construction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Start a sketch
    Sketch {
        /// Step id
        id: StepId,
        /// Zero-based index
        index: usize,
        /// Display name
        #[serde(default)]
        name: Option<String>,
    },
    /// Close a profile inside a sketch
    Profile {
        /// Profile id, referenced by extrudes
        id: ProfileRef,
        /// Zero-based index
        index: usize,
        /// Owning sketch
        sketch: StepId,
    },
    /// Extrude one or more profiles
    Extrude {
        /// Step id
        id: StepId,
        /// Zero-based index, used to name fork artifacts
        index: usize,
        /// Extent and taper
        parameters: ExtrudeParameters,
        /// Boolean operation of the primary extrude
        operation: ExtrudeOperation,
        /// Profiles consumed
        profiles: Vec<ProfileRef>,
    },
}

impl Step {
    /// Step id as text
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Sketch { id, .. } | Self::Extrude { id, .. } => id.as_str(),
            Self::Profile { id, .. } => id.as_str(),
        }
    }

    /// Zero-based index
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Sketch { index, .. }
            | Self::Profile { index, .. }
            | Self::Extrude { index, .. } => *index,
        }
    }

    /// Type tag as it appears in the log
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Sketch { .. } => "sketch",
            Self::Profile { .. } => "profile",
            Self::Extrude { .. } => "extrude",
        }
    }

    /// Whether a branch is forked after this step
    #[must_use]
    pub const fn is_fork_point(&self) -> bool {
        matches!(self, Self::Extrude { .. })
    }
}

/// An ordered construction log
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionLog {
    id: LogId,
    steps: Vec<Step>,
}

impl ConstructionLog {
    /// Create a log from already ordered steps
    #[must_use]
    pub fn new(id: LogId, steps: Vec<Step>) -> Self {
        Self { id, steps }
    }

    /// Log identifier
    #[must_use]
    pub fn id(&self) -> &LogId {
        &self.id
    }

    /// Steps in log order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the log has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of fork points
    #[must_use]
    pub fn extrude_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_fork_point()).count()
    }
}
