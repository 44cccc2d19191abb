//! Construction log discovery.

use recast_core::{CoreError, CoreResult};
use regex::Regex;
use std::path::{Path, PathBuf};

/// File names of the form `<anything>_NNNN.json`
pub const DEFAULT_PATTERN: &str = r"^.+_\d{4}\.json$";

/// Compile a file-name pattern
///
/// # Errors
///
/// Returns error if `pattern` is not a valid regex
pub fn compile_pattern(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern).map_err(|e| CoreError::InvalidParameters {
        field: "pattern".to_string(),
        reason: e.to_string(),
    })
}

/// List files in `dir` whose name matches `pattern`, sorted by name
///
/// # Errors
///
/// Returns error if the pattern is invalid or the directory cannot be read
pub fn discover_logs(dir: &Path, pattern: &str) -> CoreResult<Vec<PathBuf>> {
    let regex = compile_pattern(pattern)?;
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, &e))?;

    let mut logs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(dir, &e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| regex.is_match(name));
        if matches {
            logs.push(path);
        }
    }

    logs.sort();
    tracing::debug!(dir = %dir.display(), count = logs.len(), "Discovered construction logs");
    Ok(logs)
}
