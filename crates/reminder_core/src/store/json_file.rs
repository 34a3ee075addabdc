//! Whole-collection JSON file store.
//!
//! # Responsibility
//! - Serialize a full collection and atomically replace the target file.
//! - Decode the target file into a tri-state `LoadOutcome`.
//!
//! # Invariants
//! - `save` writes a sibling temp file, fsyncs it, then renames it over the
//!   target. Readers see either the old or the new collection.
//! - `load` has no side effects; repeated loads without a save agree.
//! - Record content is never written to logs.

use super::location::StorageLocation;
use super::{EntityKind, StoreError, StoreResult, StoredEntity};
use log::{error, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const CORRUPT_BACKUP_SUFFIX: &str = ".corrupt";

/// Result of reading one collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// No file exists yet (or it holds only whitespace).
    Empty,
    /// File decoded successfully.
    Loaded(Vec<T>),
    /// File exists but does not decode as a collection of `T`.
    Corrupt { diagnostic: String },
}

impl<T> LoadOutcome<T> {
    /// Collapses the outcome into a collection; empty for `Empty`/`Corrupt`.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Loaded(items) => items,
            Self::Empty | Self::Corrupt { .. } => Vec::new(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Stable label used in logs and FFI envelopes.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loaded(_) => "loaded",
            Self::Corrupt { .. } => "corrupt",
        }
    }
}

/// File-backed store for one entity kind.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: StoredEntity> JsonFileStore<T> {
    /// Creates a store addressing `T`'s file inside `location`.
    pub fn new(location: &StorageLocation) -> Self {
        Self {
            path: location.path_for(T::KIND),
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the on-disk collection with `items`.
    ///
    /// # Errors
    /// - `StoreError::Serialize` when encoding fails.
    /// - `StoreError::Io` when the directory, temp file or rename fails.
    pub fn save(&self, items: &[T]) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.write_collection(items) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok kind={} count={} duration_ms={}",
                    T::KIND,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error kind={} count={} duration_ms={} error_code={} error={}",
                    T::KIND,
                    items.len(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Reads the on-disk collection.
    ///
    /// # Errors
    /// - `StoreError::Io` for read failures other than "not found".
    pub fn load(&self) -> StoreResult<LoadOutcome<T>> {
        let started_at = Instant::now();
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_load module=store status=empty kind={} duration_ms={}",
                    T::KIND,
                    started_at.elapsed().as_millis()
                );
                return Ok(LoadOutcome::Empty);
            }
            Err(source) => {
                let err = StoreError::Io {
                    op: "read",
                    path: self.path.clone(),
                    source,
                };
                error!(
                    "event=store_load module=store status=error kind={} duration_ms={} error_code={} error={}",
                    T::KIND,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            info!(
                "event=store_load module=store status=empty kind={} bytes={} duration_ms={}",
                T::KIND,
                bytes.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(LoadOutcome::Empty);
        }

        match serde_json::from_slice::<Vec<T>>(&bytes) {
            Ok(items) => {
                info!(
                    "event=store_load module=store status=ok kind={} count={} duration_ms={}",
                    T::KIND,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(LoadOutcome::Loaded(items))
            }
            Err(err) => {
                // serde_json errors carry line/column only, never record text.
                let diagnostic = err.to_string();
                warn!(
                    "event=store_load module=store status=corrupt kind={} bytes={} duration_ms={} error={}",
                    T::KIND,
                    bytes.len(),
                    started_at.elapsed().as_millis(),
                    diagnostic
                );
                Ok(LoadOutcome::Corrupt { diagnostic })
            }
        }
    }

    /// Moves the current file aside to `<file>.corrupt` and returns the
    /// backup path. An existing backup is replaced.
    ///
    /// # Errors
    /// - `StoreError::Io` when the rename fails (including a missing file).
    pub fn quarantine(&self) -> StoreResult<PathBuf> {
        let backup = self.corrupt_backup_path();
        fs::rename(&self.path, &backup).map_err(|source| {
            let err = StoreError::Io {
                op: "quarantine",
                path: self.path.clone(),
                source,
            };
            error!(
                "event=store_quarantine module=store status=error kind={} error_code={} error={}",
                T::KIND,
                err.code(),
                err
            );
            err
        })?;
        warn!(
            "event=store_quarantine module=store status=ok kind={} backup={}",
            T::KIND,
            backup.display()
        );
        Ok(backup)
    }

    /// Path used by `quarantine`.
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(CORRUPT_BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    fn write_collection(&self, items: &[T]) -> StoreResult<()> {
        let encoded = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Serialize {
            kind: T::KIND,
            source,
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            op: "create_dir",
            path: dir.clone(),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(io_error("create_temp", &dir))?;
        temp.write_all(&encoded)
            .map_err(io_error("write_temp", temp.path()))?;
        temp.as_file()
            .sync_all()
            .map_err(io_error("sync_temp", temp.path()))?;
        temp.persist(&self.path).map_err(|err| StoreError::Io {
            op: "replace",
            path: self.path.clone(),
            source: err.error,
        })?;
        Ok(())
    }
}

fn io_error(op: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { op, path, source }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileStore, LoadOutcome};
    use crate::model::note::Note;
    use crate::store::location::StorageLocation;
    use std::fs;

    #[test]
    fn whitespace_only_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let location = StorageLocation::new(dir.path());
        fs::write(location.notes_path(), " \n\t").unwrap();

        let store = JsonFileStore::<Note>::new(&location);
        assert_eq!(store.load().unwrap(), LoadOutcome::Empty);
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let location = StorageLocation::new(dir.path());
        let store = JsonFileStore::<Note>::new(&location);

        store.save(&[Note::new("a"), Note::new("b")]).unwrap();
        store.save(&[Note::new("c")]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("notes.json")]);
    }

    #[test]
    fn corrupt_backup_path_appends_suffix() {
        let location = StorageLocation::new("/data");
        let store = JsonFileStore::<Note>::new(&location);
        assert_eq!(
            store.corrupt_backup_path(),
            std::path::Path::new("/data/notes.json.corrupt")
        );
    }

    #[test]
    fn into_items_collapses_non_loaded_outcomes() {
        assert!(LoadOutcome::<Note>::Empty.into_items().is_empty());
        let corrupt = LoadOutcome::<Note>::Corrupt {
            diagnostic: "expected value at line 1 column 1".to_string(),
        };
        assert!(corrupt.is_corrupt());
        assert!(corrupt.into_items().is_empty());
    }
}
