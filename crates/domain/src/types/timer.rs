//! Pending timer snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::meeting::MeetingRecord;

/// One armed timer as persisted for restart recovery.
///
/// Times are tracked explicitly at arm time rather than read back from the
/// timer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTimer {
    pub event_id: String,
    pub url: String,
    /// Epoch milliseconds when the timer was armed.
    pub armed_at: i64,
    /// Epoch milliseconds when the timer fires.
    pub fire_at: i64,
    pub meeting: MeetingRecord,
}

impl PendingTimer {
    pub fn fire_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.fire_at)
    }

    /// Whether the fire time is strictly after `now`.
    pub fn is_due_after(&self, now: DateTime<Utc>) -> bool {
        self.fire_at > now.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn pending(fire_at: i64) -> PendingTimer {
        PendingTimer {
            event_id: "e1".into(),
            url: "https://meet.google.com/abc".into(),
            armed_at: 0,
            fire_at,
            meeting: MeetingRecord {
                id: "e1".into(),
                start_time: fire_at + 60_000,
                time_zone: None,
                summary: "Sync".into(),
                original_start: None,
            },
        }
    }

    #[test]
    fn future_entries_are_due_after_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        assert!(pending(now.timestamp_millis() + 1).is_due_after(now));
        assert!(!pending(now.timestamp_millis()).is_due_after(now));
    }

    #[test]
    fn fire_time_converts_back_to_instant() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        assert_eq!(pending(now.timestamp_millis()).fire_at_utc(), Some(now));
    }
}
