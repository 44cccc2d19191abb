//! Minimal session and sink used by this crate's tests.

use crate::artifact::ExportFormat;
use crate::session::{ExportSink, ExtrudeRequest, ExtrudeResult, ModelingSession};
use recast_core::{BodyId, CoreError, CoreResult, FeatureId, ProfileRef, StepId, TimelineMarker};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Entry {
    Sketch,
    Extrude { creates_body: bool },
}

#[derive(Debug, Default)]
pub struct TestSession {
    entries: Vec<Entry>,
    position: usize,
    profiles: HashSet<ProfileRef>,
    sketches: HashSet<StepId>,
    pub calls: Vec<String>,
    pub fail_step: Option<String>,
    pub fail_alternate: bool,
    pub fail_rollback: bool,
}

impl TestSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn bodies_visible(&self) -> usize {
        self.entries[..self.position]
            .iter()
            .filter(|e| matches!(e, Entry::Extrude { creates_body: true }))
            .count()
    }

    fn append(&mut self, entry: Entry) {
        self.entries.truncate(self.position);
        self.entries.push(entry);
        self.position = self.entries.len();
    }
}

impl ModelingSession for TestSession {
    fn create_sketch(&mut self, id: &StepId, _name: Option<&str>) -> CoreResult<()> {
        self.calls.push(format!("sketch {}", id));
        if self.fail_step.as_deref() == Some(id.as_str()) {
            return Err(CoreError::StepFailed {
                step: id.to_string(),
                reason: "injected".to_string(),
            });
        }
        self.sketches.insert(id.clone());
        self.append(Entry::Sketch);
        Ok(())
    }

    fn create_profile(&mut self, profile: &ProfileRef, sketch: &StepId) -> CoreResult<()> {
        self.calls.push(format!("profile {}", profile));
        if !self.sketches.contains(sketch) {
            return Err(CoreError::UnknownSketch {
                sketch: sketch.to_string(),
            });
        }
        self.profiles.insert(profile.clone());
        Ok(())
    }

    fn extrude(&mut self, request: &ExtrudeRequest<'_>) -> CoreResult<ExtrudeResult> {
        let label = if request.alternate { "alternate" } else { "extrude" };
        self.calls.push(format!("{} {}", label, request.step));
        if request.alternate && self.fail_alternate {
            return Err(CoreError::StepFailed {
                step: request.step.to_string(),
                reason: "alternate rejected".to_string(),
            });
        }
        if !request.alternate && self.fail_step.as_deref() == Some(request.step.as_str()) {
            return Err(CoreError::StepFailed {
                step: request.step.to_string(),
                reason: "injected".to_string(),
            });
        }
        for profile in request.profiles {
            if !self.profiles.contains(profile) {
                return Err(CoreError::UnknownProfile {
                    profile: profile.to_string(),
                });
            }
        }
        let creates_body = request.operation.creates_body() || self.bodies_visible() == 0;
        self.append(Entry::Extrude { creates_body });
        let feature = FeatureId::from_raw(self.entries.len() as u64);
        let bodies = vec![BodyId::from_raw(self.bodies_visible() as u64)];
        Ok(ExtrudeResult { feature, bodies })
    }

    fn marker(&self) -> TimelineMarker {
        TimelineMarker::at(self.position)
    }

    fn roll_to(&mut self, marker: TimelineMarker) -> CoreResult<()> {
        self.calls.push(format!("roll_to {}", marker.position()));
        if self.fail_rollback || marker.position() > self.entries.len() {
            return Err(CoreError::Rollback {
                marker: marker.position(),
                reason: "refused".to_string(),
            });
        }
        self.position = marker.position();
        Ok(())
    }

    fn delete_all_after_marker(&mut self) -> CoreResult<()> {
        self.calls.push("delete_after".to_string());
        self.entries.truncate(self.position);
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.entries.len()
    }

    fn body_count(&self) -> usize {
        self.bodies_visible()
    }
}

#[derive(Debug, Default)]
pub struct TestSink {
    pub skip: HashSet<ExportFormat>,
    pub written: Vec<PathBuf>,
}

impl ExportSink for TestSink {
    fn export(&mut self, format: ExportFormat, path: &Path, bodies: &[BodyId]) -> CoreResult<()> {
        if self.skip.contains(&format) {
            return Ok(());
        }
        std::fs::write(path, format!("{} bodies\n", bodies.len()))
            .map_err(|e| CoreError::io(path, &e))?;
        self.written.push(path.to_path_buf());
        Ok(())
    }
}
