//! Result file sink for data sources

use crate::error::{CoreError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Write `value` as pretty JSON to `path`, creating parent directories
pub fn write_result_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let io_err = |source| CoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(io_err)?;

    debug!(path = %path.display(), "Wrote result file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.json");

        write_result_file(&path, &json!([{"file_system_id": "cfs-1"}])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n"));
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["file_system_id"], "cfs-1");
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_result_file(dir.path(), &json!([])).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
