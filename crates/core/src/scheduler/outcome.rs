//! Per-event outcomes and pass summaries

use serde::Serialize;

/// What one reschedule pass did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// A timer was armed for the event's open time.
    Armed,
    /// Already inside the lead window; opened during the pass.
    Opened,
    /// Inside the lead window but paused; dropped for this pass.
    Paused,
    /// The browser refused the URL; not recorded as opened.
    OpenFailed,
    /// Starts now or in the past.
    Past,
    AlreadyOpened,
    Skipped,
    /// Title matched none of the filters.
    Filtered,
    /// No joinable link for the enabled platforms.
    NoLink,
    /// Start could not be resolved to an instant.
    InvalidStart,
}

/// Counters for one reschedule pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleSummary {
    pub armed: usize,
    pub opened: usize,
    pub paused: usize,
    pub failed: usize,
    pub past: usize,
    pub already_opened: usize,
    pub skipped: usize,
    pub filtered: usize,
    pub no_link: usize,
    pub invalid: usize,
    /// Ledger entries evicted at the end of the pass.
    pub pruned: usize,
}

impl RescheduleSummary {
    pub fn record(&mut self, outcome: EventOutcome) {
        let counter = match outcome {
            EventOutcome::Armed => &mut self.armed,
            EventOutcome::Opened => &mut self.opened,
            EventOutcome::Paused => &mut self.paused,
            EventOutcome::OpenFailed => &mut self.failed,
            EventOutcome::Past => &mut self.past,
            EventOutcome::AlreadyOpened => &mut self.already_opened,
            EventOutcome::Skipped => &mut self.skipped,
            EventOutcome::Filtered => &mut self.filtered,
            EventOutcome::NoLink => &mut self.no_link,
            EventOutcome::InvalidStart => &mut self.invalid,
        };
        *counter += 1;
    }

    /// Number of events processed.
    pub fn processed(&self) -> usize {
        self.armed
            + self.opened
            + self.paused
            + self.failed
            + self.past
            + self.already_opened
            + self.skipped
            + self.filtered
            + self.no_link
            + self.invalid
    }
}

/// Result of re-arming timers from the persisted snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub restored: usize,
    /// Entries whose fire time had passed or whose meeting was already opened.
    pub dropped: usize,
}
