//! The in-memory lineage of one program run and its unsaved-changes flag.

use crate::error::Result;
use crate::lineage::Lineage;
use std::path::{Path, PathBuf};

/// Owns the working lineage and tracks whether it differs from the last save.
#[derive(Debug, Default)]
pub struct Session {
    lineage: Lineage,
    modified: bool,
    last_saved: Option<PathBuf>,
}

impl Session {
    pub fn new(lineage: Lineage) -> Self {
        Self {
            lineage,
            modified: false,
            last_saved: None,
        }
    }

    /// Start from a snapshot on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let lineage = Lineage::load_from_file(path)?;
        Ok(Self {
            lineage,
            modified: false,
            last_saved: Some(path.to_path_buf()),
        })
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// File most recently loaded from or saved to.
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    /// Run a mutation; the session is marked modified only if it succeeds.
    pub fn apply<T>(&mut self, op: impl FnOnce(&mut Lineage) -> Result<T>) -> Result<T> {
        let out = op(&mut self.lineage)?;
        self.modified = true;
        Ok(out)
    }

    /// Save to `path` and clear the modified flag. A failed save keeps the flag set.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.lineage.save_to_file(path)?;
        self.modified = false;
        self.last_saved = Some(path.to_path_buf());
        Ok(())
    }
}
