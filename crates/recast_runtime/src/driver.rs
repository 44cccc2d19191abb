//! Resumable batch driver.
//!
//! For each discovered log: skip it if the store already has an entry, else
//! checkpoint a placeholder, replay it inside a document guard, and record
//! the outcome. One log's failure never aborts the batch; only result store
//! I/O is fatal.

use crate::config::BatchConfig;
use crate::discovery::discover_logs;
use crate::document::DocumentGuard;
use recast_core::{CoreError, CoreResult, LogId};
use recast_log::ConstructionLogReader;
use recast_replay::{
    DocumentHost, ExportArtifact, ExportSink, ForkExporter, ReplayEngine, ReplayFailure,
};
use recast_storage::{ProcessingResult, ResultStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Counts from one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Logs discovered
    pub total: usize,
    /// Logs skipped because the store already had an entry
    pub skipped: usize,
    /// Logs replayed in this run
    pub attempted: usize,
    /// Logs recorded as success in this run
    pub succeeded: usize,
    /// Logs recorded as exception in this run
    pub failed: usize,
    /// Fork points exported in this run
    pub artifacts: usize,
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] designs processed successfully",
            self.succeeded, self.total
        )
    }
}

/// Batch driver over a document host, log reader, and export sink
pub struct BatchDriver<'a, H: DocumentHost> {
    config: BatchConfig,
    engine: ReplayEngine,
    host: &'a mut H,
    reader: &'a dyn ConstructionLogReader,
    sink: &'a mut dyn ExportSink,
}

impl<'a, H: DocumentHost> BatchDriver<'a, H> {
    /// Create a new batch driver
    #[must_use]
    pub fn new(
        config: BatchConfig,
        host: &'a mut H,
        reader: &'a dyn ConstructionLogReader,
        sink: &'a mut dyn ExportSink,
    ) -> Self {
        let engine = ReplayEngine::new().with_config(config.replay.clone());
        Self {
            config,
            engine,
            host,
            reader,
            sink,
        }
    }

    /// Discover logs in the configured data directory and process them
    ///
    /// # Errors
    ///
    /// Returns error if discovery fails or the result store cannot be written
    pub fn run_discovered(&mut self, store: &mut ResultStore) -> CoreResult<BatchReport> {
        let sources = discover_logs(&self.config.data_dir, &self.config.pattern)?;
        self.run(&sources, store)
    }

    /// Process `sources` in order
    ///
    /// # Errors
    ///
    /// Returns error if the output directory cannot be created or the result
    /// store cannot be written. Per-log failures are recorded, not returned.
    pub fn run(&mut self, sources: &[PathBuf], store: &mut ResultStore) -> CoreResult<BatchReport> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| CoreError::io(output_dir, &e))?;

        let mut report = BatchReport {
            total: sources.len(),
            ..BatchReport::default()
        };

        for (i, path) in sources.iter().enumerate() {
            let position = i + 1;
            let log = LogId::from_path(path)?;

            if store.contains(log.name()) {
                tracing::info!("[{}/{}] Skipping {}", position, report.total, path.display());
                report.skipped += 1;
                continue;
            }

            tracing::info!("[{}/{}] Processing {}", position, report.total, path.display());
            // Checkpoint before any work so a crash mid-log is visible on restart
            store.record(log.name(), ProcessingResult::Pending)?;
            report.attempted += 1;

            let result = match self.process(path, &log) {
                Ok(exported) => {
                    report.succeeded += 1;
                    report.artifacts += exported.len();
                    ProcessingResult::Success
                }
                Err(failure) => {
                    tracing::error!(
                        log = %log,
                        kind = failure.error.kind(),
                        "Error exporting: {}",
                        failure
                    );
                    report.failed += 1;
                    ProcessingResult::from_failure(&failure.error, &failure.trace)
                }
            };
            store.record(log.name(), result)?;
        }

        tracing::info!("----------------------------");
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Replay one log inside its own document
    fn process(&mut self, path: &Path, log: &LogId) -> Result<Vec<ExportArtifact>, ReplayFailure> {
        let frame = || format!("batch item {}", log);

        let mut guard = DocumentGuard::open(&mut *self.host, log)
            .map_err(|e| ReplayFailure::new(e, "open document").within(frame()))?;

        let construction = self
            .reader
            .read(path)
            .map_err(|e| {
                ReplayFailure::new(e, format!("read {}", path.display())).within(frame())
            })?;

        let session = guard
            .session_mut()
            .map_err(|e| ReplayFailure::new(e, "document session").within(frame()))?;
        let mut exporter = ForkExporter::new(self.config.fork_config(), &mut *self.sink);
        let summary = self
            .engine
            .reconstruct(session, &construction, &mut exporter)
            .map_err(|failure| failure.within(frame()))?;

        tracing::debug!(
            log = %log,
            steps = summary.steps,
            extrudes = summary.extrudes,
            "Replay complete"
        );
        // Dropping the guard closes the document before the outcome is recorded
        Ok(exporter.into_artifacts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_log::JsonLogReader;
    use recast_replay::ExportFormat;
    use recast_sim::{Fault, FaultPlan, FsExportSink, SimHost};
    use tempfile::TempDir;

    const HEXAGON: &str = r#"{"steps": [
        {"type": "sketch", "id": "s1", "index": 0, "name": "Hexagon"},
        {"type": "profile", "id": "p1", "index": 0, "sketch": "s1"},
        {"type": "extrude", "id": "e1", "index": 0, "parameters": {"extent_one": 2.0},
         "operation": "NewBodyFeatureOperation", "profiles": ["p1"]}
    ]}"#;

    const FIVE_STEPS: &str = r#"{"steps": [
        {"type": "sketch", "id": "s1", "index": 0},
        {"type": "profile", "id": "p1", "index": 0, "sketch": "s1"},
        {"type": "extrude", "id": "e1", "index": 0, "parameters": {"extent_one": 1.0},
         "operation": "NewBodyFeatureOperation", "profiles": ["p1"]},
        {"type": "extrude", "id": "e2", "index": 1, "parameters": {"extent_one": 1.0},
         "operation": "JoinFeatureOperation", "profiles": ["p1"]},
        {"type": "extrude", "id": "e3", "index": 2, "parameters": {"extent_one": 0.5},
         "operation": "CutFeatureOperation", "profiles": ["p1"]}
    ]}"#;

    struct Fixture {
        data: TempDir,
        out: TempDir,
    }

    impl Fixture {
        fn new(logs: &[(&str, &str)]) -> Self {
            let data = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            for (name, text) in logs {
                std::fs::write(data.path().join(name), text).unwrap();
            }
            Self { data, out }
        }

        fn config(&self) -> BatchConfig {
            BatchConfig::new(self.data.path(), self.out.path()).with_pattern(r"\.json$")
        }

        fn store(&self) -> ResultStore {
            ResultStore::open(self.config().results_path()).unwrap()
        }

        fn run(&self, host: &mut SimHost, sink: &mut FsExportSink) -> BatchReport {
            let reader = JsonLogReader::new();
            let mut store = self.store();
            BatchDriver::new(self.config(), host, &reader, sink)
                .run_discovered(&mut store)
                .unwrap()
        }

        fn store_json(&self) -> serde_json::Value {
            let text = std::fs::read_to_string(self.config().results_path()).unwrap();
            serde_json::from_str(&text).unwrap()
        }

        fn out_has(&self, name: &str) -> bool {
            self.out.path().join(name).is_file()
        }
    }

    #[test]
    fn test_hexagon_end_to_end() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.to_string(), "[1/1] designs processed successfully");
        assert_eq!(report.artifacts, 1);
        assert!(fixture.out_has("Hexagon_0000e.smt"));
        assert!(fixture.out_has("Hexagon_0000e.obj"));
        assert_eq!(
            fixture.store_json(),
            serde_json::json!({"Hexagon.json": {"status": "Success"}})
        );
        // Document closed with only the primary history: sketch + extrude
        assert_eq!(host.stats().closed_history, vec![2]);
    }

    #[test]
    fn test_one_fork_per_extrude() {
        let fixture = Fixture::new(&[("Part.json", FIVE_STEPS)]);
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.artifacts, 3);
        assert_eq!(sink.written().len(), 6);
        for index in 0..3 {
            for ext in ["smt", "obj"] {
                assert!(fixture.out_has(&format!("Part_{:04}e.{}", index, ext)));
            }
        }
        assert_eq!(host.stats().closed_history, vec![4]);
    }

    #[test]
    fn test_failure_mid_log_is_recorded_and_isolated() {
        let fixture = Fixture::new(&[("A.json", FIVE_STEPS), ("B.json", HEXAGON)]);
        // Position 3 is the second extrude
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailStep {
            log: Some("A.json".to_string()),
            position: 3,
        }));
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.to_string(), "[1/2] designs processed successfully");

        let store = fixture.store_json();
        assert_eq!(store["A.json"]["status"], "Exception");
        assert_eq!(store["A.json"]["exception"], "StepFailed");
        assert!(store["A.json"]["trace"].as_str().unwrap().contains("batch item A.json"));
        assert_eq!(store["B.json"]["status"], "Success");

        assert_eq!(host.stats().close_count("A.json"), 1);
        assert_eq!(host.stats().close_count("B.json"), 1);
        assert!(fixture.out_has("A_0000e.obj"));
        assert!(!fixture.out_has("A_0001e.smt"));
        assert!(!fixture.out_has("A_0002e.smt"));
    }

    #[test]
    fn test_missing_artifact_is_a_failure() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new().dropping(ExportFormat::Obj);

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.failed, 1);
        let store = fixture.store_json();
        assert_eq!(store["Hexagon.json"]["exception"], "ArtifactMissing");
        // The fork branch was discarded before the document closed
        assert_eq!(host.stats().closed_history, vec![2]);
    }

    #[test]
    fn test_rerun_does_not_reuse_earlier_artifacts() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();
        assert_eq!(fixture.run(&mut host, &mut sink).succeeded, 1);
        assert!(fixture.out_has("Hexagon_0000e.obj"));

        // Retry from scratch; this time the obj export silently writes nothing
        std::fs::remove_file(fixture.config().results_path()).unwrap();
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new().dropping(ExportFormat::Obj);
        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.failed, 1);
        assert_eq!(fixture.store_json()["Hexagon.json"]["exception"], "ArtifactMissing");
        assert!(!fixture.out_has("Hexagon_0000e.obj"));
    }

    #[test]
    fn test_failure_at_third_step_exports_nothing() {
        let fixture = Fixture::new(&[("A.json", FIVE_STEPS)]);
        // Position 2 is step 3 of 5, the first extrude
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailStep {
            log: Some("A.json".to_string()),
            position: 2,
        }));
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.failed, 1);
        assert_eq!(report.artifacts, 0);
        assert_eq!(fixture.store_json()["A.json"]["exception"], "StepFailed");
        assert_eq!(host.stats().close_count("A.json"), 1);
        assert!(sink.written().is_empty());
        let exported: Vec<_> = std::fs::read_dir(fixture.out.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("A_"))
            .collect();
        assert!(exported.is_empty(), "unexpected artifacts {:?}", exported);
    }

    #[test]
    fn test_completed_logs_are_skipped() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON), ("Part.json", FIVE_STEPS)]);
        let mut store = fixture.store();
        store.record("Hexagon.json", ProcessingResult::Success).unwrap();

        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();
        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.attempted, 1);
        assert_eq!(host.stats().opened, vec!["Part.json".to_string()]);
        assert!(!fixture.out_has("Hexagon_0000e.smt"));
        assert_eq!(fixture.store_json()["Hexagon.json"]["status"], "Success");
    }

    #[test]
    fn test_placeholder_is_skipped_on_restart() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let mut store = fixture.store();
        store.record("Hexagon.json", ProcessingResult::Pending).unwrap();

        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();
        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.skipped, 1);
        assert!(host.stats().opened.is_empty());
        assert_eq!(fixture.store_json(), serde_json::json!({"Hexagon.json": {}}));
    }

    /// Host that snapshots the result store file whenever a document opens
    struct PeekHost {
        inner: SimHost,
        store: PathBuf,
        seen: Vec<String>,
    }

    impl DocumentHost for PeekHost {
        type Session = <SimHost as DocumentHost>::Session;

        fn open_document(&mut self, log: &LogId) -> CoreResult<Self::Session> {
            let text = std::fs::read_to_string(&self.store).unwrap_or_default();
            self.seen.push(text);
            self.inner.open_document(log)
        }

        fn close_document(&mut self, session: Self::Session) -> CoreResult<()> {
            self.inner.close_document(session)
        }
    }

    #[test]
    fn test_placeholder_written_before_open() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let config = fixture.config();
        let mut host = PeekHost {
            inner: SimHost::new(),
            store: config.results_path(),
            seen: Vec::new(),
        };
        let reader = JsonLogReader::new();
        let mut sink = FsExportSink::new();
        let mut store = fixture.store();

        BatchDriver::new(config, &mut host, &reader, &mut sink)
            .run_discovered(&mut store)
            .unwrap();

        assert_eq!(host.seen.len(), 1);
        let at_open: serde_json::Value = serde_json::from_str(&host.seen[0]).unwrap();
        assert_eq!(at_open, serde_json::json!({"Hexagon.json": {}}));
        assert_eq!(
            fixture.store_json(),
            serde_json::json!({"Hexagon.json": {"status": "Success"}})
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let fixture = Fixture::new(&[("A.json", FIVE_STEPS), ("B.json", HEXAGON)]);
        let faults = FaultPlan::none().with(Fault::FailStep {
            log: Some("A.json".to_string()),
            position: 3,
        });

        let mut host = SimHost::with_faults(faults.clone());
        let mut sink = FsExportSink::new();
        fixture.run(&mut host, &mut sink);
        let first = std::fs::read_to_string(fixture.config().results_path()).unwrap();

        let mut host = SimHost::with_faults(faults);
        let mut sink = FsExportSink::new();
        let report = fixture.run(&mut host, &mut sink);
        let second = std::fs::read_to_string(fixture.config().results_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(report.attempted, 0);
        assert_eq!(report.skipped, 2);
        assert!(host.stats().opened.is_empty());
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_unreadable_log_is_recorded() {
        let fixture = Fixture::new(&[("Broken.json", "{\"steps\": ["), ("B.json", HEXAGON)]);
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.failed, 1);
        assert_eq!(fixture.store_json()["Broken.json"]["exception"], "ParseError");
        assert_eq!(host.stats().close_count("Broken.json"), 1);
    }

    #[test]
    fn test_open_failure_is_recorded_without_close() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailOpen {
            log: "Hexagon.json".to_string(),
        }));
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.failed, 1);
        assert_eq!(fixture.store_json()["Hexagon.json"]["exception"], "SessionError");
        assert!(host.stats().closed.is_empty());
    }

    #[test]
    fn test_close_failure_keeps_outcome() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON), ("Part.json", FIVE_STEPS)]);
        let mut host = SimHost::with_faults(FaultPlan::none().with(Fault::FailClose {
            log: "Hexagon.json".to_string(),
        }));
        let mut sink = FsExportSink::new();

        let report = fixture.run(&mut host, &mut sink);

        assert_eq!(report.succeeded, 2);
        assert_eq!(host.stats().closed.len(), 2);
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let fixture = Fixture::new(&[("Hexagon.json", HEXAGON)]);
        let config = fixture.config();
        let mut store = ResultStore::open(config.results_path()).unwrap();
        // A non-empty directory where the store file should go cannot be replaced
        std::fs::create_dir(config.results_path()).unwrap();
        std::fs::write(config.results_path().join("keep"), "x").unwrap();

        let reader = JsonLogReader::new();
        let mut host = SimHost::new();
        let mut sink = FsExportSink::new();
        let result = BatchDriver::new(config, &mut host, &reader, &mut sink)
            .run_discovered(&mut store);

        assert!(matches!(result, Err(CoreError::Io { .. })));
        assert!(host.stats().opened.is_empty());
    }
}
