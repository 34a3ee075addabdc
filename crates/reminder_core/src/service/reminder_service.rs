//! Reminder session service.
//!
//! # Responsibility
//! - Own the reminder collection and its notification scheduler.
//! - Persist first, then register the notification for new reminders.
//! - Cancel or reschedule notifications when reminders are deleted or
//!   their date changes.
//!
//! # Invariants
//! - A reminder is saved even when its notification cannot be scheduled;
//!   the scheduling outcome is returned alongside it.
//! - New or re-dated reminders must not be earlier than the current minute.

use super::{
    open_collection, persist_then_commit, remove_offsets, require_content, LoadReport,
    ServiceError, ServiceResult,
};
use crate::model::reminder::Reminder;
use crate::model::RecordId;
use crate::notify::{
    NotificationHost, NotificationRequest, NotificationScheduler, PermissionState, ScheduleError,
};
use crate::store::StorageGateway;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use log::info;

/// Result of adding one reminder.
#[derive(Debug)]
pub struct ReminderAdded {
    pub reminder: Reminder,
    pub notification: Result<NotificationRequest, ScheduleError>,
}

/// Result of editing one reminder.
#[derive(Debug)]
pub struct ReminderUpdated {
    pub reminder: Reminder,
    /// `None` when nothing the notification shows changed, or the reminder
    /// has already fired.
    pub notification: Option<Result<NotificationRequest, ScheduleError>>,
}

/// In-memory reminder collection with notification scheduling.
#[derive(Debug)]
pub struct ReminderSession<H: NotificationHost> {
    gateway: StorageGateway,
    scheduler: NotificationScheduler<H>,
    reminders: Vec<Reminder>,
    load_report: LoadReport,
}

impl<H: NotificationHost> ReminderSession<H> {
    /// Loads the persisted reminders.
    pub fn open(
        gateway: StorageGateway,
        scheduler: NotificationScheduler<H>,
    ) -> ServiceResult<Self> {
        let (reminders, load_report) = open_collection(gateway.reminders())?;
        info!(
            "event=session_open module=service status=ok kind=reminders count={}",
            reminders.len()
        );
        Ok(Self {
            gateway,
            scheduler,
            reminders,
            load_report,
        })
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    pub fn scheduler(&self) -> &NotificationScheduler<H> {
        &self.scheduler
    }

    pub fn get(&self, id: RecordId) -> Option<&Reminder> {
        self.reminders.iter().find(|reminder| reminder.id == id)
    }

    /// Runs the notification permission handshake (no-op once answered).
    pub fn request_permission(&mut self) -> PermissionState {
        self.scheduler.request_permission()
    }

    pub fn permission_state(&self) -> &PermissionState {
        self.scheduler.permission_state()
    }

    /// Re-reads `reminders.json`, discarding the in-memory collection.
    pub fn reload(&mut self) -> ServiceResult<&LoadReport> {
        let (reminders, load_report) = open_collection(self.gateway.reminders())?;
        self.reminders = reminders;
        self.load_report = load_report;
        Ok(&self.load_report)
    }

    /// Appends a reminder, persists, then schedules its notification.
    pub fn add(
        &mut self,
        content: impl Into<String>,
        date: DateTime<Utc>,
    ) -> ServiceResult<ReminderAdded> {
        let content = content.into();
        require_content(&content)?;
        require_not_past(date, Utc::now())?;

        let reminder = Reminder::new(content, date);
        let mut next = self.reminders.clone();
        next.push(reminder.clone());
        persist_then_commit(self.gateway.reminders(), &mut self.reminders, next)?;

        let notification = self.scheduler.schedule(&reminder);
        Ok(ReminderAdded {
            reminder,
            notification,
        })
    }

    /// Replaces content and date of reminder `id` and persists.
    ///
    /// A changed date cancels the pending notification and schedules a new
    /// one. Changed content re-registers the notification under the same
    /// identifier unless the reminder has already fired.
    pub fn update(
        &mut self,
        id: RecordId,
        content: impl Into<String>,
        date: DateTime<Utc>,
    ) -> ServiceResult<ReminderUpdated> {
        let content = content.into();
        require_content(&content)?;
        let index = self.position(id)?;
        let now = Utc::now();
        let date_changed = self.reminders[index].date != date;
        let content_changed = self.reminders[index].content != content;
        if date_changed {
            require_not_past(date, now)?;
        }
        let reschedule = date_changed || (content_changed && require_not_past(date, now).is_ok());

        let mut next = self.reminders.clone();
        next[index].content = content;
        next[index].date = date;
        let reminder = next[index].clone();
        persist_then_commit(self.gateway.reminders(), &mut self.reminders, next)?;

        let notification = if reschedule {
            if date_changed {
                // Cancel failures are logged by the scheduler; the new request
                // replaces the old one under the same identifier anyway.
                let _ = self.scheduler.cancel(id);
            }
            Some(self.scheduler.schedule(&reminder))
        } else {
            None
        };

        Ok(ReminderUpdated {
            reminder,
            notification,
        })
    }

    /// Removes the reminders at `offsets`, persists, then cancels their
    /// pending notifications.
    pub fn delete_at(&mut self, offsets: &[usize]) -> ServiceResult<Vec<Reminder>> {
        let mut next = self.reminders.clone();
        let removed = remove_offsets(&mut next, offsets)?;
        persist_then_commit(self.gateway.reminders(), &mut self.reminders, next)?;

        for reminder in &removed {
            // Cancel failures stay visible through `schedule_state`.
            let _ = self.scheduler.cancel(reminder.id);
        }
        Ok(removed)
    }

    /// Removes reminder `id`, persists, and cancels its notification.
    pub fn delete(&mut self, id: RecordId) -> ServiceResult<Reminder> {
        let index = self.position(id)?;
        let mut removed = self.delete_at(&[index])?;
        removed.pop().ok_or(ServiceError::NotFound(id))
    }

    fn position(&self, id: RecordId) -> ServiceResult<usize> {
        self.reminders
            .iter()
            .position(|reminder| reminder.id == id)
            .ok_or(ServiceError::NotFound(id))
    }
}

/// Rejects dates before the start of the current minute.
fn require_not_past(date: DateTime<Utc>, now: DateTime<Utc>) -> ServiceResult<()> {
    let minute_start = now.duration_trunc(TimeDelta::minutes(1)).unwrap_or(now);
    if date < minute_start {
        return Err(ServiceError::DateInPast { date });
    }
    Ok(())
}
