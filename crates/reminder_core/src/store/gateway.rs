//! Storage gateway: the four persistence entry points used by callers.
//!
//! The gateway is a plain value constructed from a `StorageLocation` and
//! passed to whatever needs persistence. It holds no mutable state; each call
//! is a self-contained read or whole-collection replace.

use super::json_file::{JsonFileStore, LoadOutcome};
use super::location::StorageLocation;
use super::StoreResult;
use crate::model::note::Note;
use crate::model::reminder::Reminder;

/// Whole-collection persistence for notes and reminders.
#[derive(Debug, Clone)]
pub struct StorageGateway {
    location: StorageLocation,
    notes: JsonFileStore<Note>,
    reminders: JsonFileStore<Reminder>,
}

impl StorageGateway {
    pub fn new(location: StorageLocation) -> Self {
        Self {
            notes: JsonFileStore::new(&location),
            reminders: JsonFileStore::new(&location),
            location,
        }
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    /// Underlying notes store, for quarantine and path inspection.
    pub fn notes(&self) -> &JsonFileStore<Note> {
        &self.notes
    }

    /// Underlying reminders store, for quarantine and path inspection.
    pub fn reminders(&self) -> &JsonFileStore<Reminder> {
        &self.reminders
    }

    pub fn save_notes(&self, notes: &[Note]) -> StoreResult<()> {
        self.notes.save(notes)
    }

    pub fn load_notes(&self) -> StoreResult<LoadOutcome<Note>> {
        self.notes.load()
    }

    pub fn save_reminders(&self, reminders: &[Reminder]) -> StoreResult<()> {
        self.reminders.save(reminders)
    }

    pub fn load_reminders(&self) -> StoreResult<LoadOutcome<Reminder>> {
        self.reminders.load()
    }
}
