//! Session services: the authoritative in-memory collections.
//!
//! # Responsibility
//! - Hold the collection the presentation layer renders and mutates.
//! - Persist the whole collection after every add/edit/delete.
//! - Recover from corrupt files without overwriting them silently.
//!
//! # Invariants
//! - A mutation is applied to memory only after the new collection was
//!   saved; on a save error memory still matches disk.
//! - New records must have non-blank content.

pub mod note_service;
pub mod reminder_service;

use crate::model::{ModelValidationError, RecordId};
use crate::store::{JsonFileStore, LoadOutcome, StoreError, StoredEntity};
use chrono::{DateTime, Utc};
use log::{error, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Session-level failures surfaced to the presentation layer.
#[derive(Debug)]
pub enum ServiceError {
    /// New record content is empty or whitespace only.
    EmptyContent,
    NotFound(RecordId),
    IndexOutOfRange { index: usize, len: usize },
    /// Reminder date is earlier than the current minute.
    DateInPast { date: DateTime<Utc> },
    Validation(ModelValidationError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for collection of {len}")
            }
            Self::DateInPast { date } => {
                write!(f, "reminder date {} is in the past", date.to_rfc3339())
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ModelValidationError> for ServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// How a session's collection was obtained from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    /// No file yet; the session starts empty.
    Empty,
    Loaded { count: usize },
    /// File was corrupt and has been moved aside; the session starts empty.
    /// `backup` is `None` when the move failed.
    Recovered {
        diagnostic: String,
        backup: Option<PathBuf>,
    },
}

pub(crate) fn open_collection<T: StoredEntity>(
    store: &JsonFileStore<T>,
) -> ServiceResult<(Vec<T>, LoadReport)> {
    match store.load()? {
        LoadOutcome::Empty => Ok((Vec::new(), LoadReport::Empty)),
        LoadOutcome::Loaded(items) => {
            let count = items.len();
            Ok((items, LoadReport::Loaded { count }))
        }
        LoadOutcome::Corrupt { diagnostic } => {
            let backup = store.quarantine().ok();
            warn!(
                "event=session_open module=service status=recovered kind={} backup_ok={}",
                store.kind(),
                backup.is_some()
            );
            Ok((Vec::new(), LoadReport::Recovered { diagnostic, backup }))
        }
    }
}

/// Saves `next` and, on success, makes it the session's collection.
pub(crate) fn persist_then_commit<T: StoredEntity>(
    store: &JsonFileStore<T>,
    current: &mut Vec<T>,
    next: Vec<T>,
) -> ServiceResult<()> {
    store.save(&next)?;
    *current = next;
    Ok(())
}

pub(crate) fn require_content(content: &str) -> ServiceResult<()> {
    if content.trim().is_empty() {
        return Err(ServiceError::EmptyContent);
    }
    Ok(())
}

/// Removes the positions in `offsets` from `items` and returns the removed
/// elements in ascending position order. Duplicate offsets count once.
pub(crate) fn remove_offsets<T>(items: &mut Vec<T>, offsets: &[usize]) -> ServiceResult<Vec<T>> {
    let unique: BTreeSet<usize> = offsets.iter().copied().collect();
    if let Some(&index) = unique.iter().find(|&&index| index >= items.len()) {
        error!(
            "event=session_delete module=service status=error error_code=index_out_of_range index={} len={}",
            index,
            items.len()
        );
        return Err(ServiceError::IndexOutOfRange {
            index,
            len: items.len(),
        });
    }

    let mut removed: Vec<T> = unique
        .into_iter()
        .rev()
        .map(|index| items.remove(index))
        .collect();
    removed.reverse();
    Ok(removed)
}
