//! Simulated modeling kernel.
//!
//! The history is a list of entries plus a roll position. Everything visible
//! (bodies, usable profiles) is derived from the entries before the roll
//! position, so rolling back and deleting entries restores earlier state
//! exactly.

use crate::fault::FaultPlan;
use recast_core::{
    BodyId, CoreError, CoreResult, FeatureId, ProfileRef, StepId, TimelineMarker,
};
use recast_log::ExtrudeOperation;
use recast_replay::{ExtrudeRequest, ExtrudeResult, ModelingSession};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Sketch {
        id: StepId,
    },
    Extrude {
        feature: FeatureId,
        operation: ExtrudeOperation,
    },
}

/// In-memory modeling session
#[derive(Debug, Clone, Default)]
pub struct SimSession {
    entries: Vec<Entry>,
    position: usize,
    /// Profile to owning sketch
    profiles: HashMap<ProfileRef, StepId>,
    next_feature: u64,
    steps_seen: usize,
    faults: FaultPlan,
}

impl SimSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with injected faults
    #[must_use]
    pub fn with_faults(faults: FaultPlan) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    /// Bodies visible at the roll position, in creation order
    #[must_use]
    pub fn bodies(&self) -> Vec<BodyId> {
        let mut bodies = Vec::new();
        for entry in &self.entries[..self.position] {
            if let Entry::Extrude { feature, operation } = entry {
                let first_join = bodies.is_empty() && *operation == ExtrudeOperation::Join;
                if operation.creates_body() || first_join {
                    bodies.push(BodyId::from_raw(feature.as_raw()));
                }
            }
        }
        bodies
    }

    /// Number of primary steps replayed so far
    #[must_use]
    pub fn steps_seen(&self) -> usize {
        self.steps_seen
    }

    fn sketch_visible(&self, sketch: &StepId) -> bool {
        self.entries[..self.position]
            .iter()
            .any(|e| matches!(e, Entry::Sketch { id } if id == sketch))
    }

    fn append(&mut self, entry: Entry) {
        // Appending at a rolled-back position drops the suppressed tail
        self.entries.truncate(self.position);
        self.entries.push(entry);
        self.position = self.entries.len();
    }

    fn check_fault(&mut self, step: &str) -> CoreResult<()> {
        let position = self.steps_seen;
        self.steps_seen += 1;
        if self.faults.fails_step(position) {
            return Err(CoreError::StepFailed {
                step: step.to_string(),
                reason: format!("injected fault at step {}", position),
            });
        }
        Ok(())
    }
}

impl ModelingSession for SimSession {
    fn create_sketch(&mut self, id: &StepId, _name: Option<&str>) -> CoreResult<()> {
        self.check_fault(id.as_str())?;
        self.append(Entry::Sketch { id: id.clone() });
        Ok(())
    }

    fn create_profile(&mut self, profile: &ProfileRef, sketch: &StepId) -> CoreResult<()> {
        self.check_fault(profile.as_str())?;
        if !self.sketch_visible(sketch) {
            return Err(CoreError::UnknownSketch {
                sketch: sketch.to_string(),
            });
        }
        self.profiles.insert(profile.clone(), sketch.clone());
        Ok(())
    }

    fn extrude(&mut self, request: &ExtrudeRequest<'_>) -> CoreResult<ExtrudeResult> {
        if request.alternate {
            if self.faults.fails_alternate(request.index) {
                return Err(CoreError::StepFailed {
                    step: request.step.to_string(),
                    reason: format!("injected fault in alternate extrude {}", request.index),
                });
            }
        } else {
            self.check_fault(request.step.as_str())?;
        }

        request.parameters.validate()?;
        if request.profiles.is_empty() {
            return Err(CoreError::StepFailed {
                step: request.step.to_string(),
                reason: "extrude has no profiles".to_string(),
            });
        }
        for profile in request.profiles {
            let visible = self
                .profiles
                .get(profile)
                .is_some_and(|sketch| self.sketch_visible(sketch));
            if !visible {
                return Err(CoreError::UnknownProfile {
                    profile: profile.to_string(),
                });
            }
        }

        let existing = self.bodies();
        let target = match request.operation {
            ExtrudeOperation::Cut | ExtrudeOperation::Intersect => match existing.last() {
                Some(body) => Some(*body),
                None => {
                    return Err(CoreError::StepFailed {
                        step: request.step.to_string(),
                        reason: "no body to cut or intersect".to_string(),
                    })
                }
            },
            ExtrudeOperation::Join => existing.last().copied(),
            ExtrudeOperation::NewBody | ExtrudeOperation::NewComponent => None,
        };

        self.next_feature += 1;
        let feature = FeatureId::from_raw(self.next_feature);
        self.append(Entry::Extrude {
            feature,
            operation: request.operation,
        });

        let body = target.unwrap_or_else(|| BodyId::from_raw(feature.as_raw()));
        Ok(ExtrudeResult {
            feature,
            bodies: vec![body],
        })
    }

    fn marker(&self) -> TimelineMarker {
        TimelineMarker::at(self.position)
    }

    fn roll_to(&mut self, marker: TimelineMarker) -> CoreResult<()> {
        if marker.position() > self.entries.len() {
            return Err(CoreError::Rollback {
                marker: marker.position(),
                reason: format!("history has only {} entries", self.entries.len()),
            });
        }
        self.position = marker.position();
        Ok(())
    }

    fn delete_all_after_marker(&mut self) -> CoreResult<()> {
        self.entries.truncate(self.position);
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.entries.len()
    }

    fn body_count(&self) -> usize {
        self.bodies().len()
    }
}
