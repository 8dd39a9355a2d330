//! Read/write lineage snapshots and manage the save directories.

use crate::error::{LineageError, Result};
use crate::lineage::Lineage;
use crate::schema;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const LINEAGE_DIR: &str = ".lineage";
const AUTOSAVE_DIR: &str = "autosave";
const SNAPSHOT_PREFIX: &str = "lineage";
const AUTOSAVE_PREFIX: &str = "autosave-lineage";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "LINEAGE_HOME";

/// Resolve the data directory: explicit path, then `LINEAGE_HOME`, then `~/.lineage`.
pub fn data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(LINEAGE_DIR))
        .ok_or_else(|| LineageError::NotFound("home directory".to_string()))
}

/// Get the autosave directory inside a data directory.
pub fn autosave_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(AUTOSAVE_DIR)
}

/// Create the data and autosave directories if missing.
pub fn ensure_dirs(data_dir: &Path) -> Result<()> {
    let dir = autosave_dir(data_dir);
    fs::create_dir_all(&dir).map_err(|source| LineageError::Io { path: dir, source })
}

/// Path of a manual snapshot taken at `at`.
pub fn snapshot_path(data_dir: &Path, at: DateTime<Local>) -> PathBuf {
    data_dir.join(format!(
        "{SNAPSHOT_PREFIX} {}.json",
        at.format(TIMESTAMP_FORMAT)
    ))
}

/// Path of an autosave snapshot taken at `at`.
pub fn autosave_path(data_dir: &Path, at: DateTime<Local>) -> PathBuf {
    autosave_dir(data_dir).join(format!(
        "{AUTOSAVE_PREFIX} {}.json",
        at.format(TIMESTAMP_FORMAT)
    ))
}

/// JSON files directly inside `dir`, newest first.
///
/// The timestamp format sorts lexically, so reverse name order is newest first.
/// A missing directory yields an empty list.
pub fn list_snapshots(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| LineageError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}

/// The newest snapshot in `dir`, if any.
pub fn latest_snapshot(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(list_snapshots(dir)?.into_iter().next())
}

/// Load a lineage from a snapshot file.
pub fn load(path: &Path) -> Result<Lineage> {
    let json = fs::read_to_string(path).map_err(|source| LineageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lineage = schema::from_json(&json)?;
    info!(path = %path.display(), persons = lineage.len(), "loaded lineage");
    Ok(lineage)
}

/// Save a lineage to a snapshot file, creating parent directories if needed.
pub fn save(path: &Path, lineage: &Lineage) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| LineageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let json = schema::to_json(lineage)?;
    fs::write(path, json).map_err(|source| LineageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), persons = lineage.len(), "saved lineage");
    Ok(())
}
