//! Path Utilities
//!
//! Resolves the engine's data directory (~/.screen-insight/) and the files
//! kept in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

const DATA_DIR_NAME: &str = ".screen-insight";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the engine directory (~/.screen-insight/)
pub fn data_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(DATA_DIR_NAME))
}

/// Get the default config file path (~/.screen-insight/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(data_dir()?.join("config.json"))
}

/// Get the default export directory (~/.screen-insight/exports/)
pub fn exports_dir() -> AppResult<PathBuf> {
    Ok(data_dir()?.join("exports"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains(DATA_DIR_NAME));
        assert!(path.ends_with("config.json"));
    }

    #[test]
    fn test_exports_dir_is_inside_data_dir() {
        assert!(exports_dir().unwrap().starts_with(data_dir().unwrap()));
    }

    #[test]
    fn test_ensure_parent_creates_nested_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a").join("b").join("out.json");
        ensure_parent(&file).unwrap();
        assert!(temp.path().join("a").join("b").is_dir());
        ensure_parent(Path::new("bare.json")).unwrap();
    }
}
