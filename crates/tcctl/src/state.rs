//! Configuration documents and state files on disk

use crate::error::{Result, TcctlError};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tencentcloud_core::resource::ResourceData;

pub type StateDocument = ResourceData<Value, Value>;

fn file_error(path: &Path, message: impl ToString) -> TcctlError {
    TcctlError::FileError {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Read a JSON or YAML document; `.yaml`/`.yml` files are parsed as YAML,
/// anything else as JSON
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| file_error(path, e))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| TcctlError::InvalidInput {
            message: format!("{}: {e}", path.display()),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| TcctlError::InvalidInput {
            message: format!("{}: {e}", path.display()),
        })
    }
}

pub fn read_state(path: &Path) -> Result<StateDocument> {
    let value = read_document(path)?;
    serde_json::from_value(value).map_err(|e| TcctlError::InvalidInput {
        message: format!("{} is not a state file: {e}", path.display()),
    })
}

pub fn write_state(path: &Path, state: &StateDocument) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content).map_err(|e| file_error(path, e))
}

pub fn remove_state(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(file_error(path, e)),
    }
}
