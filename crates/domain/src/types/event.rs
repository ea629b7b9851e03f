//! Calendar event model
//!
//! Mirrors the subset of the Google Calendar `Event` resource the scheduler
//! reads. Unknown fields are ignored on deserialization.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{AutoJoinError, Result};

/// A single calendar event instance (recurring events arrive expanded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub start: EventStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_data: Option<ConferenceData>,
}

/// Event start: either an all-day `date` or a `dateTime`, plus an optional
/// IANA zone name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Structured conferencing information attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_id: Option<String>,
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}

/// One way of joining a conference (video, phone, sip, more).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub entry_point_type: String,
    pub uri: String,
}

impl EventStart {
    /// Start from an RFC 3339 timestamp with an explicit offset.
    pub fn at(date_time: impl Into<String>, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    /// The start value exactly as the calendar provided it.
    pub fn original(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    /// Resolve the absolute start instant.
    ///
    /// Wall-clock values are interpreted in the event's own zone, never the
    /// host's, so the result does not change when the machine moves zones.
    pub fn utc_instant(&self) -> Result<DateTime<Utc>> {
        if let Some(raw) = self.date_time.as_deref() {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Ok(parsed.with_timezone(&Utc));
            }
            let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map_err(
                |e| AutoJoinError::InvalidInput(format!("unparseable start dateTime '{raw}': {e}")),
            )?;
            return self.localize(naive);
        }

        if let Some(raw) = self.date.as_deref() {
            let midnight = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| {
                    AutoJoinError::InvalidInput(format!("unparseable start date '{raw}': {e}"))
                })?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| AutoJoinError::InvalidInput(format!("no midnight on {raw}")))?;
            return self.localize(midnight);
        }

        Err(AutoJoinError::InvalidInput("event start has neither dateTime nor date".into()))
    }

    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
        let Some(name) = self.time_zone.as_deref() else {
            return Ok(Utc.from_utc_datetime(&naive));
        };
        let tz: Tz = name
            .parse()
            .map_err(|_| AutoJoinError::InvalidInput(format!("unknown time zone '{name}'")))?;

        match tz.from_local_datetime(&naive) {
            LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
            // DST fall-back: the first occurrence of the repeated hour
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(AutoJoinError::InvalidInput(format!(
                "{naive} does not exist in {name}"
            ))),
        }
    }
}

impl CalendarEvent {
    /// Absolute start instant of this event.
    pub fn start_utc(&self) -> Result<DateTime<Utc>> {
        self.start.utc_instant()
    }
}
