//! Domain model for the two record kinds managed by core.
//!
//! # Responsibility
//! - Define `Note` and `Reminder`, the records persisted by the storage
//!   gateway and rendered by the presentation layer.
//! - Validate identity on construction and on deserialization.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - Notes and reminders never reference each other.

pub mod note;
pub mod reminder;

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier shared by both record kinds.
pub type RecordId = Uuid;

/// Validation failures for record construction and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelValidationError {
    /// The nil UUID cannot identify a record.
    NilId,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be the nil uuid"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn validate_id(id: RecordId) -> Result<(), ModelValidationError> {
    if id.is_nil() {
        return Err(ModelValidationError::NilId);
    }
    Ok(())
}
