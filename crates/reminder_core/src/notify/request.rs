//! Notification payload handed to the host service.

use super::trigger::CalendarTrigger;
use crate::model::reminder::Reminder;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};

/// Fixed title shown on every reminder alert.
pub const NOTIFICATION_TITLE: &str = "Reminder";

/// Alert sound requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSound {
    Default,
}

/// One-shot notification registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Reminder id in hyphenated string form.
    pub identifier: String,
    pub title: String,
    /// Reminder content, verbatim.
    pub body: String,
    pub trigger: CalendarTrigger,
    /// Always `false`; reminders fire once.
    pub repeats: bool,
    pub sound: NotificationSound,
}

impl NotificationRequest {
    /// Builds the request for `reminder` with trigger fields in `tz`.
    pub fn for_reminder<Tz: TimeZone>(reminder: &Reminder, tz: &Tz) -> Self {
        Self {
            identifier: reminder.id.to_string(),
            title: NOTIFICATION_TITLE.to_string(),
            body: reminder.content.clone(),
            trigger: CalendarTrigger::from_instant(&reminder.date, tz),
            repeats: false,
            sound: NotificationSound::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationRequest;
    use crate::model::reminder::Reminder;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn request_serializes_to_host_payload_shape() {
        let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap();
        let reminder = Reminder::with_id(id, "water plants", date).unwrap();

        let request = NotificationRequest::for_reminder(&reminder, &Utc);
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "identifier": "11111111-2222-4333-8444-555555555555",
                "title": "Reminder",
                "body": "water plants",
                "trigger": {"year": 2025, "month": 3, "day": 1, "hour": 14, "minute": 37},
                "repeats": false,
                "sound": "default"
            })
        );
    }
}
