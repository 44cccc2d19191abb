//! File-backed result store.
//!
//! Every persist serializes the whole map into a temp file in the store's
//! directory and renames it over the store file, so the file on disk is
//! always the last fully persisted state.

use crate::result::{ProcessingResult, StoreCounts};
use indexmap::IndexMap;
use recast_core::CoreError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing, or renaming the store file failed
    #[error("I/O error while {operation} {path}: {source}")]
    Io {
        /// What was being done
        operation: &'static str,
        /// Store file or temp file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The store file is not a valid result map
    #[error("failed to parse result store {path}: {source}")]
    Parse {
        /// Store file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Io { path, .. } => CoreError::Io {
                path: path.display().to_string(),
                reason: err.to_string(),
            },
            StoreError::Parse { .. } => CoreError::Parse {
                message: err.to_string(),
            },
        }
    }
}

/// Durable map from log file name to processing result
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
    results: IndexMap<String, ProcessingResult>,
}

impl ResultStore {
    /// Open the store at `path`, starting empty if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let results = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::io("reading", &path, e))?;
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            IndexMap::new()
        };

        tracing::debug!(path = %path.display(), entries = results.len(), "Opened result store");
        Ok(Self { path, results })
    }

    /// Store file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a log already has an entry of any kind
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Get the entry for a log
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProcessingResult> {
        self.results.get(name)
    }

    /// Set an entry in memory without persisting
    pub fn set(&mut self, name: impl Into<String>, result: ProcessingResult) {
        self.results.insert(name.into(), result);
    }

    /// Set an entry and persist the whole store
    ///
    /// # Errors
    ///
    /// Returns error if persisting fails; the in-memory entry is kept
    pub fn record(
        &mut self,
        name: impl Into<String>,
        result: ProcessingResult,
    ) -> Result<(), StoreError> {
        self.set(name, result);
        self.persist()
    }

    /// Replace the store file with the current map
    ///
    /// # Errors
    ///
    /// Returns error if the temp file cannot be written or renamed
    pub fn persist(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io("creating", dir, e))?;

        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        serde::Serialize::serialize(&self.results, &mut ser).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| StoreError::io("creating temp file in", dir, e))?;
        tmp.write_all(&bytes)
            .map_err(|e| StoreError::io("writing", tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io("syncing", tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io("replacing", &self.path, e.error))?;

        Ok(())
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProcessingResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if the store has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Count entries per status
    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        let mut counts = StoreCounts::default();
        for result in self.results.values() {
            match result {
                ProcessingResult::Pending => counts.pending += 1,
                ProcessingResult::Success => counts.success += 1,
                ProcessingResult::Exception { .. } => counts.exception += 1,
            }
        }
        counts
    }
}
