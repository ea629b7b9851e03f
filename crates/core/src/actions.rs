//! User-initiated meeting operations
//!
//! Skip/restore, join now, per-event lead times, pause and filter edits.
//! These write the same durable state the scheduler reads, so they take
//! effect at the scheduler's next read without any cache invalidation.

use autojoin_domain::constants::KEY_LAST_TIME_ZONE;
use autojoin_domain::{
    AutoJoinError, CalendarEvent, MeetingLink, MeetingPlatform, MeetingRecord, Result, Settings,
    SettingsPatch, StorageArea,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::meeting::{extract_meeting_url, is_eligible};
use crate::scheduler::MeetingScheduler;

/// Everything the UI shows about one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStatus {
    pub event_id: String,
    pub opened: bool,
    pub skipped: bool,
    pub eligible: bool,
    pub url: Option<String>,
    pub platform: Option<MeetingPlatform>,
    pub lead_minutes: u32,
    /// Epoch milliseconds of the armed timer, if any.
    pub scheduled_for: Option<i64>,
}

/// Operations triggered by the user rather than the calendar
#[derive(Clone)]
pub struct MeetingActions {
    scheduler: MeetingScheduler,
}

impl MeetingActions {
    pub fn new(scheduler: MeetingScheduler) -> Self {
        Self { scheduler }
    }

    pub async fn settings(&self) -> Result<Settings> {
        self.scheduler.settings().load().await
    }

    /// Mark or unmark `event` as skipped. Skipping also disarms its timer.
    pub async fn set_skipped(&self, event: &CalendarEvent, skipped: bool) -> Result<()> {
        let record = MeetingRecord::from_event(event)?;
        self.scheduler.ledger().set_skipped(&record, skipped).await?;
        if skipped {
            self.scheduler.cancel_timer(&event.id).await?;
        }
        info!(event_id = %event.id, skipped, "Updated meeting skip");
        Ok(())
    }

    /// Open `event`'s link right away and skip it for automatic opening.
    ///
    /// Platform toggles apply, title filters do not. Fails with `NotFound`
    /// when the event has no link.
    pub async fn join_now(&self, event: &CalendarEvent) -> Result<MeetingLink> {
        let settings = self.scheduler.settings().load().await?;
        let link = extract_meeting_url(event, &settings).ok_or_else(|| {
            AutoJoinError::NotFound(format!("no meeting link for event {}", event.id))
        })?;
        let record = MeetingRecord::from_event(event)?;

        let browser = self.scheduler.browser();
        let tab = browser.open_tab(&link.url).await?;
        if let Err(err) = browser.focus_window(&tab).await {
            warn!(event_id = %event.id, error = %err, "Failed to focus meeting window");
        }

        self.scheduler.ledger().set_skipped(&record, true).await?;
        self.scheduler.cancel_timer(&event.id).await?;
        info!(event_id = %event.id, url = %link.url, "Joined meeting on request");
        Ok(link)
    }

    pub async fn set_event_override(&self, event_id: &str, minutes: Option<u32>) -> Result<()> {
        self.scheduler.settings().set_event_override(event_id, minutes).await
    }

    pub async fn set_paused(&self, paused: bool) -> Result<()> {
        self.scheduler.settings().set_paused(paused).await?;
        info!(paused, "Updated auto-open pause");
        Ok(())
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        self.scheduler.settings().apply(patch).await
    }

    pub async fn add_filter(&self, pattern: &str) -> Result<Settings> {
        self.scheduler.settings().add_filter(pattern).await
    }

    pub async fn remove_filter(&self, pattern: &str) -> Result<Settings> {
        self.scheduler.settings().remove_filter(pattern).await
    }

    pub async fn meeting_status(&self, event: &CalendarEvent) -> Result<MeetingStatus> {
        let settings = self.scheduler.settings().load().await?;
        let key = MeetingRecord::from_event(event)?.key();
        let link = extract_meeting_url(event, &settings);
        let scheduled_for = self
            .scheduler
            .pending_timers()
            .into_iter()
            .find(|pending| pending.event_id == event.id)
            .map(|pending| pending.fire_at);

        Ok(MeetingStatus {
            event_id: event.id.clone(),
            opened: self.scheduler.ledger().has_been_opened(&key).await?,
            skipped: self.scheduler.ledger().is_skipped(&key).await?,
            eligible: is_eligible(event, &settings),
            platform: link.as_ref().map(|link| link.platform),
            url: link.map(|link| link.url),
            lead_minutes: self.scheduler.settings().lead_minutes(&event.id, &settings).await?,
            scheduled_for,
        })
    }

    /// Store the host's zone name. Returns the previous name if it changed.
    ///
    /// Meeting keys use each event's own zone, so a host change needs no
    /// ledger reset.
    pub async fn record_host_time_zone(&self, zone: &str) -> Result<Option<String>> {
        let store = self.scheduler.store();
        let previous: Option<String> =
            store.get_or_default(StorageArea::Local, KEY_LAST_TIME_ZONE).await?;
        if previous.as_deref() == Some(zone) {
            return Ok(None);
        }

        store.set(StorageArea::Local, KEY_LAST_TIME_ZONE, zone).await?;
        match &previous {
            Some(old) => info!(from = %old, to = zone, "Host time zone changed"),
            None => info!(zone, "Recorded host time zone"),
        }
        Ok(previous)
    }
}
