//! Core domain logic for the Reminder app.
//! This crate is the single source of truth for persistence and
//! notification-scheduling contracts; UI shells call into it.

pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;
pub mod store;

pub use config::{ConfigError, ConfigOverrides, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::Note;
pub use model::reminder::Reminder;
pub use model::{ModelValidationError, RecordId};
pub use notify::{
    CalendarTrigger, HostError, InMemoryHost, NotificationHost, NotificationRequest,
    NotificationScheduler, PermissionState, ScheduleError, ScheduleState,
};
pub use service::note_service::NoteSession;
pub use service::reminder_service::{ReminderAdded, ReminderSession, ReminderUpdated};
pub use service::{LoadReport, ServiceError, ServiceResult};
pub use store::{
    EntityKind, JsonFileStore, LoadOutcome, StorageGateway, StorageLocation, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
