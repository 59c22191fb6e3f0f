//! Storage layer for JSON persistence
//!
//! Small key-value surface over JSON files in the application config
//! directory. Readers must tolerate absent files; a present-but-unparsable
//! file is an error the caller decides how to handle.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::app::NAME;
use crate::error::{AppError, Result};

/// Get the application config directory path
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir().map(|p| p.join(NAME)).ok_or_else(|| {
        AppError::Storage("Could not determine config directory; is HOME set?".to_string())
    })
}

/// Get path to a data file in the config directory
pub fn data_path(filename: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(filename))
}

/// Load data from a JSON file at a specific path.
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but can't be read or parsed.
pub fn load_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::Storage(format!("Failed to read {:?}: {}", path, e)));
        }
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    let data = serde_json::from_str(&content)
        .map_err(|e| AppError::Storage(format!("Failed to parse {:?}: {}", path, e)))?;
    Ok(Some(data))
}

/// Save data as JSON to a specific path, creating parent directories.
pub fn save_to<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
    }

    let content = serde_json::to_string_pretty(data)
        .map_err(|e| AppError::Storage(format!("Failed to serialize data: {}", e)))?;
    fs::write(path, content)
        .map_err(|e| AppError::Storage(format!("Failed to write {:?}: {}", path, e)))
}

/// Delete a file; missing files are not an error.
pub fn delete_at(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::Storage(format!("Failed to delete {:?}: {}", path, e))),
    }
}

/// Load data from a JSON file in the config directory
pub fn load<T: DeserializeOwned>(filename: &str) -> Result<Option<T>> {
    load_from(&data_path(filename)?)
}

/// Save data to a JSON file in the config directory
pub fn save<T: Serialize>(filename: &str, data: &T) -> Result<()> {
    save_to(&data_path(filename)?, data)
}
