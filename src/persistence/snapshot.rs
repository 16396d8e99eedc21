// * Snapshot artifacts
// * Each pipeline stage persists its output as a pretty-printed UTF-8 JSON
// * array. Writes go through a temp file and an atomic rename so a crashed
// * run never leaves a torn file at the destination path.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Writes rows as a pretty JSON array via temp file + atomic rename.
pub fn save_json<T: Serialize>(rows: &[T], path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, rows)?;
        file.flush()?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a JSON array of records. A missing file or a non-array payload
/// yields an empty batch; malformed JSON is an error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SnapshotError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    match value {
        serde_json::Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                rows.push(serde_json::from_value(item)?);
            }
            Ok(rows)
        }
        _ => Ok(Vec::new()),
    }
}

/// Removes a snapshot if present; used by force-fresh runs.
pub fn remove_if_present(path: &Path) {
    if path.exists() {
        if let Err(error) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %error, "failed to remove stale snapshot");
        }
    }
}
