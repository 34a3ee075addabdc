//! Local JSON persistence for notes and reminders.
//!
//! # Responsibility
//! - Resolve the sandboxed data directory and per-kind file paths.
//! - Read and replace whole collections atomically.
//! - Report every failure as a typed `StoreError` instead of masking it.
//!
//! # Invariants
//! - One file per entity kind; the file holds the complete collection.
//! - A reader never observes a partially written file.
//! - "No data yet" and "data present but corrupt" are distinct outcomes.

pub mod gateway;
pub mod json_file;
pub mod location;

use crate::model::note::Note;
use crate::model::reminder::Reminder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use gateway::StorageGateway;
pub use json_file::{JsonFileStore, LoadOutcome};
pub use location::StorageLocation;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record kinds managed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Notes,
    Reminders,
}

impl EntityKind {
    /// Stable label used in logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Reminders => "reminders",
        }
    }

    /// File name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Notes => location::NOTES_FILE_NAME,
            Self::Reminders => location::REMINDERS_FILE_NAME,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record type that can be stored as a whole-collection JSON file.
pub trait StoredEntity: Serialize + DeserializeOwned {
    const KIND: EntityKind;
}

impl StoredEntity for Note {
    const KIND: EntityKind = EntityKind::Notes;
}

impl StoredEntity for Reminder {
    const KIND: EntityKind = EntityKind::Reminders;
}

/// Storage failure surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure (permission, disk full, missing directory, ...).
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    /// Collection could not be encoded as JSON.
    Serialize {
        kind: EntityKind,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Stable short code for log lines and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "store_io_failed",
            Self::Serialize { .. } => "store_serialize_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "{op} failed for `{}`: {source}", path.display())
            }
            Self::Serialize { kind, source } => {
                write!(f, "failed to serialize {kind}: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
        }
    }
}
