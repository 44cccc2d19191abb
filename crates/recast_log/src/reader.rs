//! Construction log readers.

use crate::step::{ConstructionLog, Step};
use recast_core::{CoreError, CoreResult, LogId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Parses a persisted construction log into ordered steps
pub trait ConstructionLogReader {
    /// Read the log stored at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid log
    fn read(&self, path: &Path) -> CoreResult<ConstructionLog>;
}

#[derive(Debug, Deserialize)]
struct LogDocument {
    steps: Vec<Step>,
}

/// Reader for `{"steps": [...]}` JSON construction logs
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogReader;

impl JsonLogReader {
    /// Create a new reader
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse log text that belongs to `id`
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON, duplicate step ids, duplicate extrude
    /// indices, or invalid extrude parameters
    pub fn parse(&self, id: LogId, text: &str) -> CoreResult<ConstructionLog> {
        let doc: LogDocument = serde_json::from_str(text).map_err(|e| CoreError::Parse {
            message: format!("{}: {}", id, e),
        })?;
        validate_steps(&id, &doc.steps)?;
        tracing::debug!(log = %id, steps = doc.steps.len(), "Parsed construction log");
        Ok(ConstructionLog::new(id, doc.steps))
    }
}

impl ConstructionLogReader for JsonLogReader {
    fn read(&self, path: &Path) -> CoreResult<ConstructionLog> {
        let id = LogId::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, &e))?;
        self.parse(id, &text)
    }
}

fn validate_steps(id: &LogId, steps: &[Step]) -> CoreResult<()> {
    let mut ids = HashSet::new();
    let mut extrude_indices = HashSet::new();

    for step in steps {
        if !ids.insert(step.id()) {
            return Err(CoreError::Parse {
                message: format!("{}: duplicate step id {}", id, step.id()),
            });
        }
        if let Step::Extrude {
            index, parameters, ..
        } = step
        {
            // Artifact names are derived from the index
            if !extrude_indices.insert(*index) {
                return Err(CoreError::Parse {
                    message: format!("{}: duplicate extrude index {}", id, index),
                });
            }
            parameters.validate()?;
        }
    }

    Ok(())
}
