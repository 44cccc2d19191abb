//! Batch configuration.

use crate::discovery::{compile_pattern, DEFAULT_PATTERN};
use recast_core::{CoreError, CoreResult};
use recast_replay::{ExportFormat, ForkConfig, ReplayConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result store file name used when none is configured
pub const DEFAULT_RESULTS_FILE: &str = "reconverter_results.json";

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

/// Batch driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory holding construction logs
    pub data_dir: PathBuf,
    /// Directory artifacts and, by default, the result store go into
    pub output_dir: PathBuf,
    /// Result store path; defaults to `output_dir/reconverter_results.json`
    #[serde(default)]
    pub results_file: Option<PathBuf>,
    /// Regex log file names must match
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Formats written at every fork point
    #[serde(default = "ExportFormat::default_pair")]
    pub formats: Vec<ExportFormat>,
    /// Replay engine settings
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl BatchConfig {
    /// Create a config with default pattern, formats, and store location
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            results_file: None,
            pattern: default_pattern(),
            formats: ExportFormat::default_pair(),
            replay: ReplayConfig::default(),
        }
    }

    /// Load a JSON config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, &e))?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Set the result store path
    #[must_use]
    pub fn with_results_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_file = Some(path.into());
        self
    }

    /// Set the file-name pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set export formats
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Effective result store path
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.results_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DEFAULT_RESULTS_FILE))
    }

    /// Fork exporter settings derived from this config
    #[must_use]
    pub fn fork_config(&self) -> ForkConfig {
        ForkConfig::new(&self.output_dir).with_formats(self.formats.clone())
    }

    /// Check the config is usable
    ///
    /// # Errors
    ///
    /// Returns error on an empty or duplicated format list or a bad pattern
    pub fn validate(&self) -> CoreResult<()> {
        if self.formats.is_empty() {
            return Err(CoreError::InvalidParameters {
                field: "formats".to_string(),
                reason: "at least one export format is required".to_string(),
            });
        }
        let unique: HashSet<_> = self.formats.iter().collect();
        if unique.len() != self.formats.len() {
            return Err(CoreError::InvalidParameters {
                field: "formats".to_string(),
                reason: "export formats must not repeat".to_string(),
            });
        }
        compile_pattern(&self.pattern)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BatchConfig::new("/data", "/out");
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.formats, ExportFormat::default_pair());
        assert_eq!(
            config.results_path(),
            PathBuf::from("/out/reconverter_results.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = BatchConfig::new("/data", "/out")
            .with_results_file("/state/results.json")
            .with_pattern(r"\.json$")
            .with_formats(vec![ExportFormat::Step]);
        assert_eq!(config.results_path(), PathBuf::from("/state/results.json"));
        assert_eq!(config.fork_config().formats, vec![ExportFormat::Step]);
        assert_eq!(config.fork_config().output_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_config_validate() {
        let empty = BatchConfig::new("/d", "/o").with_formats(Vec::new());
        assert!(empty.validate().is_err());

        let repeated =
            BatchConfig::new("/d", "/o").with_formats(vec![ExportFormat::Obj, ExportFormat::Obj]);
        assert!(repeated.validate().is_err());

        let bad_pattern = BatchConfig::new("/d", "/o").with_pattern("[");
        assert!(bad_pattern.validate().is_err());
    }

    #[test]
    fn test_config_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recast.json");
        std::fs::write(
            &path,
            r#"{"data_dir": "/data", "output_dir": "/out", "formats": ["obj", "stl"]}"#,
        )
        .unwrap();

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.formats, vec![ExportFormat::Obj, ExportFormat::Stl]);
        assert!(!config.replay.fail_on_empty_log);
    }

    #[test]
    fn test_config_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recast.json");
        std::fs::write(&path, "{").unwrap();
        assert_eq!(BatchConfig::load(&path).unwrap_err().kind(), "ParseError");
    }
}
