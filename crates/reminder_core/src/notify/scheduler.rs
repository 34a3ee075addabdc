//! Notification scheduler with explicit permission and schedule state.
//!
//! # Responsibility
//! - Request notification permission at most once per definite answer.
//! - Register one-shot calendar notifications for reminders.
//! - Expose the outcome of both as queryable state.
//!
//! # Invariants
//! - `Granted` and `Denied` are terminal for `request_permission`; only
//!   `NotRequested` and `Failed` reach the host.
//! - Every `schedule` call leaves a `ScheduleState` for the reminder id.

use super::host::{HostError, NotificationHost};
use super::request::NotificationRequest;
use crate::model::reminder::Reminder;
use crate::model::RecordId;
use chrono::{Local, TimeZone};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notification authorization state as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionState {
    NotRequested,
    /// Prompt handed to the host; answer not yet recorded.
    Pending,
    Granted,
    Denied,
    /// Prompt failed; may be retried.
    Failed(String),
}

impl PermissionState {
    /// Stable label used in logs and FFI envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "not_requested",
            Self::Pending => "pending",
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Failed(_) => "failed",
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }
}

/// Last known registration state of one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    Scheduled,
    Failed(String),
    Cancelled,
}

impl ScheduleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Reasons a reminder could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    PermissionNotRequested,
    PermissionPending,
    PermissionDenied,
    PermissionFailed(String),
    Host(HostError),
}

impl ScheduleError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionNotRequested => "permission_not_requested",
            Self::PermissionPending => "permission_pending",
            Self::PermissionDenied => "permission_denied",
            Self::PermissionFailed(_) => "permission_failed",
            Self::Host(_) => "host_rejected",
        }
    }
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionNotRequested => {
                write!(f, "notification permission has not been requested")
            }
            Self::PermissionPending => write!(f, "notification permission is still pending"),
            Self::PermissionDenied => write!(f, "notification permission was denied"),
            Self::PermissionFailed(reason) => {
                write!(f, "notification permission request failed: {reason}")
            }
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for ScheduleError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}

/// Scheduler over one host notification service.
#[derive(Debug)]
pub struct NotificationScheduler<H: NotificationHost> {
    host: H,
    permission: PermissionState,
    schedules: HashMap<RecordId, ScheduleState>,
}

impl<H: NotificationHost> NotificationScheduler<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            permission: PermissionState::NotRequested,
            schedules: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn permission_state(&self) -> &PermissionState {
        &self.permission
    }

    /// Last recorded state for `id`, if it was ever scheduled.
    pub fn schedule_state(&self, id: RecordId) -> Option<&ScheduleState> {
        self.schedules.get(&id)
    }

    /// Asks the host for permission unless an answer is already known.
    pub fn request_permission(&mut self) -> PermissionState {
        if self.permission.is_settled() {
            return self.permission.clone();
        }

        self.permission = PermissionState::Pending;
        info!("event=notify_permission module=notify status=start");
        match self.host.request_authorization() {
            Ok(granted) => self.record_permission_outcome(granted, None),
            Err(err) => self.record_permission_outcome(false, Some(err.to_string())),
        }
        self.permission.clone()
    }

    /// Marks a prompt as handed to an out-of-process host.
    ///
    /// Returns `false` when an answer is already known and no prompt is
    /// needed.
    pub fn begin_permission_request(&mut self) -> bool {
        if self.permission.is_settled() {
            return false;
        }
        self.permission = PermissionState::Pending;
        true
    }

    /// Applies an authorization outcome delivered by the host.
    ///
    /// `error` takes precedence over `granted`.
    pub fn record_permission_outcome(&mut self, granted: bool, error: Option<String>) {
        self.permission = match error {
            Some(reason) => {
                error!(
                    "event=notify_permission module=notify status=error error={}",
                    reason
                );
                PermissionState::Failed(reason)
            }
            None if granted => {
                info!("event=notify_permission module=notify status=granted");
                PermissionState::Granted
            }
            None => {
                warn!("event=notify_permission module=notify status=denied");
                PermissionState::Denied
            }
        };
    }

    /// Schedules `reminder` with trigger fields in the host's local zone.
    pub fn schedule(&mut self, reminder: &Reminder) -> Result<NotificationRequest, ScheduleError> {
        self.schedule_in(reminder, &Local)
    }

    /// Schedules `reminder` with trigger fields in `tz`.
    ///
    /// # Errors
    /// - Permission errors when permission is not `Granted`.
    /// - `ScheduleError::Host` when the host rejects the request.
    pub fn schedule_in<Tz: TimeZone>(
        &mut self,
        reminder: &Reminder,
        tz: &Tz,
    ) -> Result<NotificationRequest, ScheduleError> {
        let request = self.prepare_request_in(reminder, tz)?;
        let outcome = self.host.add_request(&request).map_err(ScheduleError::from);
        self.record_schedule_outcome(reminder.id, outcome)?;
        Ok(request)
    }

    /// Builds the host payload for `reminder` after checking permission.
    ///
    /// Used when the host registration runs outside this process. A failed
    /// permission check is recorded against the reminder.
    pub fn prepare_request_in<Tz: TimeZone>(
        &mut self,
        reminder: &Reminder,
        tz: &Tz,
    ) -> Result<NotificationRequest, ScheduleError> {
        if let Err(err) = self.ensure_permission() {
            return Err(self.record_failure(reminder.id, err));
        }
        Ok(NotificationRequest::for_reminder(reminder, tz))
    }

    /// Records the registration result for `id` and returns it unchanged.
    pub fn record_schedule_outcome(
        &mut self,
        id: RecordId,
        outcome: Result<(), ScheduleError>,
    ) -> Result<(), ScheduleError> {
        match outcome {
            Ok(()) => {
                info!(
                    "event=notify_schedule module=notify status=ok reminder_id={}",
                    id
                );
                self.schedules.insert(id, ScheduleState::Scheduled);
                Ok(())
            }
            Err(err) => Err(self.record_failure(id, err)),
        }
    }

    fn record_failure(&mut self, id: RecordId, err: ScheduleError) -> ScheduleError {
        error!(
            "event=notify_schedule module=notify status=error reminder_id={} error_code={} error={}",
            id,
            err.code(),
            err
        );
        self.schedules
            .insert(id, ScheduleState::Failed(err.to_string()));
        err
    }

    /// Removes the pending notification for `id`.
    pub fn cancel(&mut self, id: RecordId) -> Result<(), HostError> {
        match self.host.remove_pending(&[id.to_string()]) {
            Ok(()) => {
                info!(
                    "event=notify_cancel module=notify status=ok reminder_id={}",
                    id
                );
                self.schedules.insert(id, ScheduleState::Cancelled);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=notify_cancel module=notify status=error reminder_id={} error={}",
                    id, err
                );
                Err(err)
            }
        }
    }

    /// Drops the recorded state for `id` once its reminder no longer exists.
    pub fn forget(&mut self, id: RecordId) -> Option<ScheduleState> {
        self.schedules.remove(&id)
    }

    fn ensure_permission(&self) -> Result<(), ScheduleError> {
        match &self.permission {
            PermissionState::Granted => Ok(()),
            PermissionState::NotRequested => Err(ScheduleError::PermissionNotRequested),
            PermissionState::Pending => Err(ScheduleError::PermissionPending),
            PermissionState::Denied => Err(ScheduleError::PermissionDenied),
            PermissionState::Failed(reason) => Err(ScheduleError::PermissionFailed(reason.clone())),
        }
    }
}
