//! Meeting scheduling commands

use std::time::Instant;

use autojoin_core::{MeetingStatus, RescheduleSummary};
use autojoin_domain::{CalendarEvent, MeetingLink, PendingTimer, Result};
use tracing::info;

use crate::utils::logging::log_command_result;
use crate::AppContext;

/// Replace all armed timers with a schedule built from `events`.
pub async fn schedule_meetings(
    ctx: &AppContext,
    events: &[CalendarEvent],
) -> Result<RescheduleSummary> {
    let command_name = "meetings::schedule_meetings";
    let start = Instant::now();

    info!(command = command_name, events = events.len(), "Scheduling meetings");
    let result = ctx.scheduler.reschedule(events).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn refresh_now(ctx: &AppContext) -> Result<RescheduleSummary> {
    let command_name = "meetings::refresh_now";
    let start = Instant::now();

    let result = ctx.refresh_now().await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn skip_meeting(ctx: &AppContext, event: &CalendarEvent, skipped: bool) -> Result<()> {
    let command_name = "meetings::skip_meeting";
    let start = Instant::now();

    let result = ctx.actions.set_skipped(event, skipped).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

/// Open `event` immediately; it will not be auto-opened afterwards.
pub async fn join_now(ctx: &AppContext, event: &CalendarEvent) -> Result<MeetingLink> {
    let command_name = "meetings::join_now";
    let start = Instant::now();

    let result = ctx.actions.join_now(event).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn meeting_status(ctx: &AppContext, event: &CalendarEvent) -> Result<MeetingStatus> {
    let command_name = "meetings::meeting_status";
    let start = Instant::now();

    let result = ctx.actions.meeting_status(event).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub fn pending_meetings(ctx: &AppContext) -> Vec<PendingTimer> {
    ctx.scheduler.pending_timers()
}
