//! Calendar-field triggers.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Calendar match for a non-repeating notification.
///
/// Fields are local to the time zone the trigger was computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarTrigger {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CalendarTrigger {
    /// Extracts year/month/day/hour/minute of `instant` as seen in `tz`.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CalendarTrigger;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn trigger_fields_follow_time_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        let berlin_winter = FixedOffset::east_opt(3600).unwrap();

        let trigger = CalendarTrigger::from_instant(&instant, &berlin_winter);
        assert_eq!(
            trigger,
            CalendarTrigger {
                year: 2026,
                month: 1,
                day: 1,
                hour: 0,
                minute: 30,
            }
        );
    }

    #[test]
    fn seconds_are_dropped() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap();
        let trigger = CalendarTrigger::from_instant(&instant, &Utc);
        assert_eq!((trigger.hour, trigger.minute), (14, 37));
    }
}
