//! The companion's memory file: a pretty-printed JSON snapshot rewritten on
//! every mutation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use righton_core::{EchoState, Memory, export_json, import_json};

use crate::error::{Result, StoreError};

/// File name used when no path is configured (relative to the working directory).
pub const DEFAULT_MEMORY_FILE: &str = ".jinxecho_memory.json";

pub fn default_memory_path() -> PathBuf {
    PathBuf::from(DEFAULT_MEMORY_FILE)
}

/// Write the persisted part of `state` to `path`, replacing any previous file.
pub fn save_memory(path: &Path, state: &EchoState) -> Result<()> {
    let json = export_json(state)
        .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))?;
    fs::write(path, json).map_err(|e| StoreError::io(path, e))
}

/// Read a memory file. A missing file is `Ok(None)`.
pub fn load_memory(path: &Path) -> Result<Option<Memory>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    import_json(&json)
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid memory file: {e}")))
}
