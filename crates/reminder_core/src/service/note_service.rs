//! Note session service.
//!
//! # Invariants
//! - Note order is insertion order; edits keep a note's position.
//! - Every successful mutation rewrites `notes.json` in full.

use super::{
    open_collection, persist_then_commit, remove_offsets, require_content, LoadReport,
    ServiceError, ServiceResult,
};
use crate::model::note::Note;
use crate::model::RecordId;
use crate::store::StorageGateway;
use log::info;

/// In-memory note collection bound to a storage gateway.
#[derive(Debug)]
pub struct NoteSession {
    gateway: StorageGateway,
    notes: Vec<Note>,
    load_report: LoadReport,
}

impl NoteSession {
    /// Loads the persisted notes.
    ///
    /// A corrupt file is moved aside and the session starts empty; see
    /// `load_report`.
    pub fn open(gateway: StorageGateway) -> ServiceResult<Self> {
        let (notes, load_report) = open_collection(gateway.notes())?;
        info!(
            "event=session_open module=service status=ok kind=notes count={}",
            notes.len()
        );
        Ok(Self {
            gateway,
            notes,
            load_report,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    pub fn get(&self, id: RecordId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Re-reads `notes.json`, discarding the in-memory collection.
    pub fn reload(&mut self) -> ServiceResult<&LoadReport> {
        let (notes, load_report) = open_collection(self.gateway.notes())?;
        self.notes = notes;
        self.load_report = load_report;
        Ok(&self.load_report)
    }

    /// Appends a new note and persists the collection.
    pub fn add(&mut self, content: impl Into<String>) -> ServiceResult<Note> {
        let content = content.into();
        require_content(&content)?;

        let note = Note::new(content);
        let mut next = self.notes.clone();
        next.push(note.clone());
        persist_then_commit(self.gateway.notes(), &mut self.notes, next)?;
        Ok(note)
    }

    /// Replaces the content of note `id` and persists the collection.
    pub fn edit(&mut self, id: RecordId, content: impl Into<String>) -> ServiceResult<Note> {
        let content = content.into();
        require_content(&content)?;
        let index = self.position(id)?;
        let mut next = self.notes.clone();
        next[index].content = content;
        let updated = next[index].clone();
        persist_then_commit(self.gateway.notes(), &mut self.notes, next)?;
        Ok(updated)
    }

    /// Removes the notes at `offsets` (display positions) and persists.
    pub fn delete_at(&mut self, offsets: &[usize]) -> ServiceResult<Vec<Note>> {
        let mut next = self.notes.clone();
        let removed = remove_offsets(&mut next, offsets)?;
        persist_then_commit(self.gateway.notes(), &mut self.notes, next)?;
        Ok(removed)
    }

    /// Removes note `id` and persists.
    pub fn delete(&mut self, id: RecordId) -> ServiceResult<Note> {
        let index = self.position(id)?;
        let mut removed = self.delete_at(&[index])?;
        removed.pop().ok_or(ServiceError::NotFound(id))
    }

    fn position(&self, id: RecordId) -> ServiceResult<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(ServiceError::NotFound(id))
    }
}
