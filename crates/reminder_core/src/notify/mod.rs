//! One-shot reminder notifications.
//!
//! # Responsibility
//! - Derive calendar triggers and notification payloads from reminders.
//! - Run the permission handshake against a host notification service.
//! - Track observable permission and per-reminder scheduling state.
//!
//! # Invariants
//! - Payloads are keyed by the reminder id, so a reminder can be cancelled.
//! - Triggers carry minute granularity; seconds are dropped.
//! - Scheduling never proceeds without a granted permission.

pub mod host;
pub mod request;
pub mod scheduler;
pub mod trigger;

pub use host::{HostError, InMemoryHost, NotificationHost};
pub use request::{NotificationRequest, NotificationSound, NOTIFICATION_TITLE};
pub use scheduler::{NotificationScheduler, PermissionState, ScheduleError, ScheduleState};
pub use trigger::CalendarTrigger;
