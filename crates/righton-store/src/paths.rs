//! Where RightOn keeps its files.
//!
//! Layout:
//! ```text
//! ~/.righton/            ($RIGHTON_DATA_DIR overrides)
//! ├── righton.toml       optional configuration
//! └── righton.db         web application store
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

pub const DATA_DIR_ENV: &str = "RIGHTON_DATA_DIR";
pub const DATABASE_FILE: &str = "righton.db";
pub const CONFIG_FILE: &str = "righton.toml";

/// Default base directory: `~/.righton`.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".righton")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Explicit override, else `$RIGHTON_DATA_DIR`, else [`default_base_dir`].
pub fn resolve_base_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    env::var(DATA_DIR_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_base_dir)
}

pub fn database_path(base: &Path) -> PathBuf {
    base.join(DATABASE_FILE)
}

pub fn config_path(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = Path::new("/tmp/righton-override");
        assert_eq!(resolve_base_dir(Some(dir)), dir);
    }

    #[test]
    fn test_file_names() {
        let base = Path::new("/data");
        assert_eq!(database_path(base), Path::new("/data/righton.db"));
        assert_eq!(config_path(base), Path::new("/data/righton.toml"));
    }

    #[test]
    fn test_default_base_is_dot_righton() {
        assert!(default_base_dir().ends_with(".righton"));
    }

    #[test]
    fn test_ensure_parent_creates_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db = tmp.path().join("a").join("b").join("righton.db");
        ensure_parent(&db).unwrap();
        assert!(tmp.path().join("a").join("b").is_dir());
        // bare file names have no parent to create
        ensure_parent(Path::new("righton.db")).unwrap();
    }

    #[test]
    fn test_ensure_parent_keeps_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = ensure_parent(&blocker.join("sub").join("righton.db")).unwrap_err();
        match err {
            StoreError::Io { path, source } => {
                assert_eq!(path, blocker.join("sub"));
                assert_ne!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
