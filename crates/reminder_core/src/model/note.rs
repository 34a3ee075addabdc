//! Note record.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - Equality and hashing cover both `id` and `content`.

use super::{validate_id, ModelValidationError, RecordId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TITLE_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Free-form text note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NoteWire")]
pub struct Note {
    /// Stable identity; distinguishes notes with identical content.
    pub id: RecordId,
    /// Unbounded user text. May contain newlines.
    pub content: String,
}

#[derive(Deserialize)]
struct NoteWire {
    id: Uuid,
    content: String,
}

impl TryFrom<NoteWire> for Note {
    type Error = ModelValidationError;

    fn try_from(value: NoteWire) -> Result<Self, Self::Error> {
        Self::with_id(value.id, value.content)
    }
}

impl Note {
    /// Creates a note with a freshly generated id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
        }
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by import and FFI paths where identity already exists.
    ///
    /// # Errors
    /// - Returns `ModelValidationError::NilId` for the nil uuid.
    pub fn with_id(id: RecordId, content: impl Into<String>) -> Result<Self, ModelValidationError> {
        validate_id(id)?;
        Ok(Self {
            id,
            content: content.into(),
        })
    }

    /// Returns the list-row label: first non-blank line, whitespace collapsed,
    /// capped at 100 chars.
    pub fn title(&self) -> String {
        let first_line = self
            .content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("");
        let collapsed = WHITESPACE_RE.replace_all(first_line, " ");
        collapsed.chars().take(TITLE_MAX_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Note;

    #[test]
    fn title_uses_first_non_blank_line() {
        let note = Note::new("\n   \n  Groceries\t list \nmilk\neggs");
        assert_eq!(note.title(), "Groceries list");
    }

    #[test]
    fn title_is_capped() {
        let note = Note::new("x".repeat(250));
        assert_eq!(note.title().chars().count(), 100);
    }

    #[test]
    fn title_of_blank_note_is_empty() {
        assert_eq!(Note::new("  \n ").title(), "");
    }
}
