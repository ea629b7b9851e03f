//! Meeting scheduler
//!
//! Turns a batch of calendar events into armed timers (or immediate opens)
//! and keeps a persisted snapshot of the armed set so a restart can re-arm
//! them.
//!
//! Every pass starts by cancelling all timers and rebuilds from scratch, so
//! repeated passes over overlapping event sets converge on the same state.
//! Passes, restores and timer firings are serialised by one async lock. A
//! firing timer claims its map entry by generation under that lock; a timer
//! that was cancelled or replaced in the meantime finds nothing to claim and
//! never opens.

mod outcome;
mod snapshot;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use autojoin_common::time::{spawn_after, Clock, SystemClock, TimerHandle};
use autojoin_domain::constants::LEDGER_RETENTION_HOURS;
use autojoin_domain::{CalendarEvent, MeetingRecord, PendingTimer, Result};
use chrono::Duration;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

pub use self::outcome::{EventOutcome, RescheduleSummary, RestoreSummary};
use self::snapshot::TimerSnapshot;
use crate::ledger::MeetingLedger;
use crate::meeting::{extract_meeting_url, is_eligible};
use crate::ports::{BrowserPort, CalendarSource, KeyValueStore};
use crate::settings::SettingsRepository;
use crate::storage::StoreAccessor;

struct ArmedTimer {
    handle: TimerHandle,
    generation: u64,
    pending: PendingTimer,
}

struct SchedulerInner {
    store: StoreAccessor,
    settings: SettingsRepository,
    ledger: MeetingLedger,
    snapshot: TimerSnapshot,
    browser: Arc<dyn BrowserPort>,
    clock: Arc<dyn Clock>,
    timers: Mutex<HashMap<String, ArmedTimer>>,
    pass_lock: tokio::sync::Mutex<()>,
    next_generation: AtomicU64,
}

impl Drop for SchedulerInner {
    fn drop(&mut self) {
        for timer in self.timers.get_mut().values() {
            timer.handle.cancel();
        }
    }
}

/// Schedules meeting opens. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct MeetingScheduler {
    inner: Arc<SchedulerInner>,
}

impl MeetingScheduler {
    pub fn new(store: Arc<dyn KeyValueStore>, browser: Arc<dyn BrowserPort>) -> Self {
        Self::with_clock(store, browser, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        browser: Arc<dyn BrowserPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let accessor = StoreAccessor::new(store);
        Self {
            inner: Arc::new(SchedulerInner {
                settings: SettingsRepository::new(accessor.clone()),
                ledger: MeetingLedger::new(accessor.clone()),
                snapshot: TimerSnapshot::new(accessor.clone()),
                store: accessor,
                browser,
                clock,
                timers: Mutex::new(HashMap::new()),
                pass_lock: tokio::sync::Mutex::new(()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &StoreAccessor {
        &self.inner.store
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.inner.settings
    }

    pub fn ledger(&self) -> &MeetingLedger {
        &self.inner.ledger
    }

    pub fn browser(&self) -> &Arc<dyn BrowserPort> {
        &self.inner.browser
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Cancel every timer and rebuild from `events`, processed in order.
    ///
    /// Store failures abort the pass; timers cancelled before the failure
    /// stay cancelled until the next pass.
    #[instrument(skip(self, events), fields(events = events.len()))]
    pub async fn reschedule(&self, events: &[CalendarEvent]) -> Result<RescheduleSummary> {
        let _pass = self.inner.pass_lock.lock().await;

        let cancelled = self.cancel_all();
        self.inner.snapshot.clear().await?;
        debug!(cancelled, "Cleared pending timers");

        let mut summary = RescheduleSummary::default();
        for event in events {
            let outcome = self.process_event(event).await?;
            debug!(event_id = %event.id, ?outcome, "Processed event");
            summary.record(outcome);
        }

        let cutoff = self.inner.clock.now() - Duration::hours(LEDGER_RETENTION_HOURS);
        summary.pruned = self.inner.ledger.prune_older_than(cutoff).await?;

        info!(
            armed = summary.armed,
            opened = summary.opened,
            processed = summary.processed(),
            pruned = summary.pruned,
            "Reschedule pass complete"
        );
        Ok(summary)
    }

    /// Fetch today's events from `source` and reschedule them.
    ///
    /// A failed fetch leaves the current timers untouched.
    pub async fn refresh(&self, source: &dyn CalendarSource) -> Result<RescheduleSummary> {
        let events = source.fetch_todays_events().await.inspect_err(|err| {
            warn!(error = %err, "Calendar fetch failed; keeping current timers");
        })?;
        self.reschedule(&events).await
    }

    /// Re-arm timers from the persisted snapshot.
    ///
    /// Entries whose fire time has passed are dropped, never fired late.
    /// So are entries already opened or skipped.
    #[instrument(skip(self))]
    pub async fn restore_pending(&self) -> Result<RestoreSummary> {
        let _pass = self.inner.pass_lock.lock().await;

        let entries = self.inner.snapshot.load().await?;
        let now = self.inner.clock.now();
        let mut summary = RestoreSummary::default();

        for entry in entries {
            let key = entry.meeting.key();
            let stale = !entry.is_due_after(now)
                || self.has_pending(&entry.event_id)
                || self.inner.ledger.has_been_opened(&key).await?
                || self.inner.ledger.is_skipped(&key).await?;
            if stale {
                debug!(event_id = %entry.event_id, "Dropping snapshot entry");
                summary.dropped += 1;
                continue;
            }
            self.arm(entry);
            summary.restored += 1;
        }

        self.persist_snapshot().await?;
        info!(restored = summary.restored, dropped = summary.dropped, "Restored pending timers");
        Ok(summary)
    }

    /// Cancel the timer for one event, if armed.
    pub async fn cancel_timer(&self, event_id: &str) -> Result<bool> {
        let removed = self.inner.timers.lock().remove(event_id);
        let Some(timer) = removed else {
            return Ok(false);
        };

        timer.handle.cancel();
        self.persist_snapshot().await?;
        debug!(event_id, "Cancelled meeting timer");
        Ok(true)
    }

    /// Cancel all timers without touching the snapshot, so the next start
    /// can restore them.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.cancel_all();
        info!(cancelled, "Meeting scheduler stopped");
        cancelled
    }

    /// Armed timers ordered by fire time.
    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut pending: Vec<PendingTimer> =
            self.inner.timers.lock().values().map(|timer| timer.pending.clone()).collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.event_id.cmp(&b.event_id)));
        pending
    }

    pub fn has_pending(&self, event_id: &str) -> bool {
        self.inner.timers.lock().contains_key(event_id)
    }

    async fn process_event(&self, event: &CalendarEvent) -> Result<EventOutcome> {
        let settings = self.inner.settings.load().await?;
        let lead_minutes = self.inner.settings.lead_minutes(&event.id, &settings).await?;
        let now = self.inner.clock.now();

        let start = match event.start_utc() {
            Ok(start) => start,
            Err(err) => {
                warn!(event_id = %event.id, error = %err, "Skipping event with unusable start");
                return Ok(EventOutcome::InvalidStart);
            }
        };
        if start <= now {
            return Ok(EventOutcome::Past);
        }

        let record = MeetingRecord::from_event(event)?;
        let key = record.key();
        if self.inner.ledger.has_been_opened(&key).await? {
            return Ok(EventOutcome::AlreadyOpened);
        }
        if self.inner.ledger.is_skipped(&key).await? {
            return Ok(EventOutcome::Skipped);
        }
        if !is_eligible(event, &settings) {
            return Ok(EventOutcome::Filtered);
        }
        let Some(link) = extract_meeting_url(event, &settings) else {
            return Ok(EventOutcome::NoLink);
        };

        let lead = Duration::minutes(i64::from(lead_minutes));
        if start - now > lead {
            let fire_at = start - lead;
            info!(event_id = %event.id, %fire_at, lead_minutes, "Armed meeting timer");
            self.arm(PendingTimer {
                event_id: event.id.clone(),
                url: link.url,
                armed_at: now.timestamp_millis(),
                fire_at: fire_at.timestamp_millis(),
                meeting: record,
            });
            self.persist_snapshot().await?;
            return Ok(EventOutcome::Armed);
        }

        self.open_meeting(&link.url, &record).await
    }

    /// Pause check, open, focus, record. Callers hold the pass lock.
    async fn open_meeting(&self, url: &str, record: &MeetingRecord) -> Result<EventOutcome> {
        if self.inner.settings.is_paused().await? {
            info!(event_id = %record.id, "Auto-open paused; dropping meeting");
            return Ok(EventOutcome::Paused);
        }

        let tab = match self.inner.browser.open_tab(url).await {
            Ok(tab) => tab,
            Err(err) => {
                error!(event_id = %record.id, url, error = %err, "Failed to open meeting");
                return Ok(EventOutcome::OpenFailed);
            }
        };
        if let Err(err) = self.inner.browser.focus_window(&tab).await {
            warn!(event_id = %record.id, error = %err, "Failed to focus meeting window");
        }

        self.inner.ledger.mark_opened(record).await?;
        info!(event_id = %record.id, summary = %record.summary, url, "Opened meeting");
        Ok(EventOutcome::Opened)
    }

    fn arm(&self, pending: PendingTimer) {
        let remaining_ms = pending.fire_at - self.inner.clock.timestamp_millis();
        let delay = std::time::Duration::from_millis(u64::try_from(remaining_ms).unwrap_or(0));
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        let weak = Arc::downgrade(&self.inner);
        let event_id = pending.event_id.clone();
        let handle = spawn_after(delay, async move {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.fire(&event_id, generation).await;
            }
        });

        let previous = self
            .inner
            .timers
            .lock()
            .insert(pending.event_id.clone(), ArmedTimer { handle, generation, pending });
        if let Some(previous) = previous {
            previous.handle.cancel();
        }
    }

    async fn fire(&self, event_id: &str, generation: u64) {
        let _pass = self.inner.pass_lock.lock().await;

        let claimed = {
            let mut timers = self.inner.timers.lock();
            let current = timers.get(event_id).is_some_and(|timer| timer.generation == generation);
            if current {
                timers.remove(event_id).map(|timer| timer.pending)
            } else {
                None
            }
        };
        let Some(pending) = claimed else {
            debug!(event_id, generation, "Timer superseded before firing");
            return;
        };

        let outcome = match self.inner.ledger.is_skipped(&pending.meeting.key()).await {
            Ok(true) => {
                info!(event_id, "Meeting skipped after arming; not opening");
                Ok(EventOutcome::Skipped)
            }
            Ok(false) => self.open_meeting(&pending.url, &pending.meeting).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(outcome) => debug!(event_id, ?outcome, "Meeting timer fired"),
            Err(err) => error!(event_id, error = %err, "Meeting timer failed"),
        }
        if let Err(err) = self.persist_snapshot().await {
            error!(event_id, error = %err, "Failed to persist timer snapshot");
        }
    }

    fn cancel_all(&self) -> usize {
        let drained: Vec<ArmedTimer> =
            self.inner.timers.lock().drain().map(|(_, timer)| timer).collect();
        for timer in &drained {
            timer.handle.cancel();
        }
        drained.len()
    }

    async fn persist_snapshot(&self) -> Result<()> {
        let written = self.inner.snapshot.write(|| self.pending_timers()).await?;
        debug!(written, "Persisted timer snapshot");
        Ok(())
    }
}
