//! Fault injection for exercising failure paths.

use recast_core::{CoreError, CoreResult, LogId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single injected fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum Fault {
    /// Reject the primary step at this zero-based position in log order
    FailStep {
        /// Log the fault applies to; `None` for every log
        log: Option<String>,
        /// Zero-based step position
        position: usize,
    },
    /// Reject the alternate extrude of the fork at this extrude index
    FailAlternate {
        /// Log the fault applies to; `None` for every log
        log: Option<String>,
        /// Extrude index
        index: usize,
    },
    /// Refuse to open the document for a log
    FailOpen {
        /// Log file name
        log: String,
    },
    /// Refuse to close the document for a log
    FailClose {
        /// Log file name
        log: String,
    },
}

impl Fault {
    fn applies_to(&self, log: &LogId) -> bool {
        match self {
            Self::FailStep { log: target, .. } | Self::FailAlternate { log: target, .. } => {
                target.as_deref().map_or(true, |name| name == log.name())
            }
            Self::FailOpen { log: name } | Self::FailClose { log: name } => name == log.name(),
        }
    }
}

/// Set of faults to inject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultPlan {
    faults: Vec<Fault>,
}

impl FaultPlan {
    /// Load a plan from a JSON file holding `{"faults": [...]}`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, &e))?;
        let plan: Self = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), faults = plan.faults.len(), "Loaded fault plan");
        Ok(plan)
    }

    /// Plan with no faults
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a fault
    #[must_use]
    pub fn with(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Faults that apply to `log`
    #[must_use]
    pub fn for_log(&self, log: &LogId) -> Self {
        Self {
            faults: self
                .faults
                .iter()
                .filter(|f| f.applies_to(log))
                .cloned()
                .collect(),
        }
    }

    /// Whether the primary step at `position` should fail
    #[must_use]
    pub fn fails_step(&self, position: usize) -> bool {
        self.faults
            .iter()
            .any(|f| matches!(f, Fault::FailStep { position: p, .. } if *p == position))
    }

    /// Whether the alternate extrude at `index` should fail
    #[must_use]
    pub fn fails_alternate(&self, index: usize) -> bool {
        self.faults
            .iter()
            .any(|f| matches!(f, Fault::FailAlternate { index: i, .. } if *i == index))
    }

    /// Whether opening the document should fail
    #[must_use]
    pub fn fails_open(&self) -> bool {
        self.faults.iter().any(|f| matches!(f, Fault::FailOpen { .. }))
    }

    /// Whether closing the document should fail
    #[must_use]
    pub fn fails_close(&self) -> bool {
        self.faults.iter().any(|f| matches!(f, Fault::FailClose { .. }))
    }

    /// Check if the plan injects nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }
}
