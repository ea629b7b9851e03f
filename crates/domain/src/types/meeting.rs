//! Meeting identity and ledger records

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::impl_domain_status_conversions;
use crate::types::event::CalendarEvent;

/// Identity of one meeting occurrence: `(eventId, utcStartMillis, timeZone)`.
///
/// Two events are the same occurrence only if all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeetingKey {
    pub event_id: String,
    pub start_time: i64,
    pub time_zone: Option<String>,
}

impl MeetingKey {
    /// Derive the key from an event, resolving its start through the
    /// event's own zone.
    pub fn for_event(event: &CalendarEvent) -> Result<Self> {
        Ok(Self {
            event_id: event.id.clone(),
            start_time: event.start_utc()?.timestamp_millis(),
            time_zone: event.start.time_zone.clone(),
        })
    }
}

/// Durable ledger entry (opened or skipped).
///
/// Field names match the documents the browser extension stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub id: String,
    /// Start instant in epoch milliseconds.
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_start: Option<String>,
}

impl MeetingRecord {
    pub fn from_event(event: &CalendarEvent) -> Result<Self> {
        let key = MeetingKey::for_event(event)?;
        Ok(Self {
            id: key.event_id,
            start_time: key.start_time,
            time_zone: key.time_zone,
            summary: event.summary.clone(),
            original_start: event.start.original().map(str::to_string),
        })
    }

    pub fn key(&self) -> MeetingKey {
        MeetingKey {
            event_id: self.id.clone(),
            start_time: self.start_time,
            time_zone: self.time_zone.clone(),
        }
    }

    pub fn matches(&self, key: &MeetingKey) -> bool {
        self.id == key.event_id && self.start_time == key.start_time && self.time_zone == key.time_zone
    }
}

/// Conferencing provider a link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPlatform {
    GoogleMeet,
    Zoom,
}

impl_domain_status_conversions!(MeetingPlatform {
    GoogleMeet => "google_meet",
    Zoom => "zoom",
});

/// A joinable URL extracted from an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingLink {
    pub url: String,
    pub platform: MeetingPlatform,
}
