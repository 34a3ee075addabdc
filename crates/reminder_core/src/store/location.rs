//! Storage location resolution.
//!
//! # Invariants
//! - A location is fixed for the lifetime of the value that holds it.
//! - File names never change: `notes.json` and `reminders.json`.

use super::EntityKind;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const NOTES_FILE_NAME: &str = "notes.json";
pub const REMINDERS_FILE_NAME: &str = "reminders.json";

const APP_QUALIFIER: &str = "app";
const APP_ORGANIZATION: &str = "reminder";
const APP_NAME: &str = "Reminder";

/// Sandboxed application data directory holding both collection files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    root: PathBuf,
}

impl StorageLocation {
    /// Uses `root` as the data directory. The directory is created lazily on
    /// first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the per-user application data directory for this platform.
    ///
    /// Returns `None` when the platform exposes no home directory.
    pub fn platform_default() -> Option<Self> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| Self::new(dirs.data_dir()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the collection file for one entity kind.
    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    pub fn notes_path(&self) -> PathBuf {
        self.path_for(EntityKind::Notes)
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.path_for(EntityKind::Reminders)
    }
}
