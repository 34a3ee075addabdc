//! Reminder record and its on-disk date encoding.
//!
//! # Invariants
//! - `date` is an absolute instant; calendar fields are derived per time zone.
//! - The model accepts past dates. Rejecting them is a session-layer rule.
//!
//! # Compatibility
//! - Dates are written as RFC 3339 UTC strings.
//! - Dates are read from RFC 3339 strings or from the legacy numeric encoding
//!   (seconds since 2001-01-01T00:00:00Z) found in older `reminders.json`.

use super::{validate_id, ModelValidationError, RecordId};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Timed reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReminderWire")]
pub struct Reminder {
    /// Stable identity; also the notification identifier.
    pub id: RecordId,
    /// Notification body text.
    pub content: String,
    /// Instant at which the reminder should fire.
    pub date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ReminderWire {
    id: Uuid,
    content: String,
    #[serde(deserialize_with = "date_format::deserialize")]
    date: DateTime<Utc>,
}

impl TryFrom<ReminderWire> for Reminder {
    type Error = ModelValidationError;

    fn try_from(value: ReminderWire) -> Result<Self, Self::Error> {
        Self::with_id(value.id, value.content, value.date)
    }
}

impl Reminder {
    /// Creates a reminder with a freshly generated id.
    pub fn new(content: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            date,
        }
    }

    /// Creates a reminder with a caller-provided id.
    ///
    /// # Errors
    /// - Returns `ModelValidationError::NilId` for the nil uuid.
    pub fn with_id(
        id: RecordId,
        content: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        validate_id(id)?;
        Ok(Self {
            id,
            content: content.into(),
            date,
        })
    }

    /// Formats `date` as a medium date with short time, e.g.
    /// `Mar 1, 2025 at 2:37 PM`.
    pub fn display_date<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.date
            .with_timezone(tz)
            .format("%b %-d, %Y at %-I:%M %p")
            .to_string()
    }
}

mod date_format {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    /// Unix timestamp of 2001-01-01T00:00:00Z, in milliseconds.
    const LEGACY_REFERENCE_EPOCH_MS: i64 = 978_307_200_000;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        LegacySeconds(f64),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawDate::deserialize(deserializer)? {
            RawDate::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|value| value.with_timezone(&Utc))
                .map_err(|err| D::Error::custom(format!("invalid reminder date `{text}`: {err}"))),
            RawDate::LegacySeconds(seconds) => from_legacy_seconds(seconds).ok_or_else(|| {
                D::Error::custom(format!("legacy reminder date out of range: {seconds}"))
            }),
        }
    }

    pub(super) fn from_legacy_seconds(seconds: f64) -> Option<DateTime<Utc>> {
        if !seconds.is_finite() {
            return None;
        }
        let offset_ms = (seconds * 1000.0).round();
        if offset_ms.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(LEGACY_REFERENCE_EPOCH_MS + offset_ms as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::date_format::from_legacy_seconds;
    use super::Reminder;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn legacy_seconds_are_relative_to_2001() {
        let decoded = from_legacy_seconds(0.0).expect("zero should decode");
        assert_eq!(decoded, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());

        let decoded = from_legacy_seconds(762_536_272.5).expect("value should decode");
        assert_eq!(decoded.timestamp(), 1_740_843_472);
        assert_eq!(decoded.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn legacy_seconds_reject_non_finite_values() {
        assert!(from_legacy_seconds(f64::NAN).is_none());
        assert!(from_legacy_seconds(f64::INFINITY).is_none());
    }

    #[test]
    fn display_date_uses_medium_date_and_short_time() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap();
        let reminder = Reminder::new("call mom", date);
        assert_eq!(reminder.display_date(&Utc), "Mar 1, 2025 at 2:37 PM");

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(reminder.display_date(&tokyo), "Mar 1, 2025 at 11:37 PM");
    }
}
