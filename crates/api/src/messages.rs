//! Inbound message protocol
//!
//! One JSON object per line in, one response object per line out. Requests
//! are tagged by `type`; responses are `{"success": true, "data": ...}` or
//! `{"success": false, "error": "<message>", "errorType": "<label>"}`.
//!
//! ```text
//! {"type":"SCHEDULE_MEETINGS","events":[...]}
//! {"success":true,"data":{"armed":2,"opened":0,...}}
//! ```

use autojoin_domain::{AutoJoinError, CalendarEvent, Result, SettingsPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::commands;
use crate::utils::logging::error_label;
use crate::AppContext;

/// A request from the UI or an external trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    ScheduleMeetings {
        events: Vec<CalendarEvent>,
    },
    RefreshNow,
    SetPaused {
        paused: bool,
    },
    SkipMeeting {
        event: CalendarEvent,
        #[serde(default = "default_true")]
        skipped: bool,
    },
    JoinNow {
        event: CalendarEvent,
    },
    #[serde(rename_all = "camelCase")]
    SetEventOverride {
        event_id: String,
        #[serde(default)]
        auto_open_minutes: Option<u32>,
    },
    AddFilter {
        pattern: String,
    },
    RemoveFilter {
        pattern: String,
    },
    UpdateSettings {
        settings: SettingsPatch,
    },
    GetSettings,
    GetStatus {
        event: CalendarEvent,
    },
    GetPending,
}

fn default_true() -> bool {
    true
}

impl InboundMessage {
    /// Protocol name of the message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ScheduleMeetings { .. } => "SCHEDULE_MEETINGS",
            Self::RefreshNow => "REFRESH_NOW",
            Self::SetPaused { .. } => "SET_PAUSED",
            Self::SkipMeeting { .. } => "SKIP_MEETING",
            Self::JoinNow { .. } => "JOIN_NOW",
            Self::SetEventOverride { .. } => "SET_EVENT_OVERRIDE",
            Self::AddFilter { .. } => "ADD_FILTER",
            Self::RemoveFilter { .. } => "REMOVE_FILTER",
            Self::UpdateSettings { .. } => "UPDATE_SETTINGS",
            Self::GetSettings => "GET_SETTINGS",
            Self::GetStatus { .. } => "GET_STATUS",
            Self::GetPending => "GET_PENDING",
        }
    }
}

/// Reply to one inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable failure label, e.g. `invalid_pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl MessageResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self { success: true, data, error: None, error_type: None }
    }

    pub fn failure(error: &AutoJoinError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_type: Some(error_label(error).to_string()),
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|value| serde_json::to_value(value).map_err(AutoJoinError::from)) {
            Ok(Value::Null) => Self::ok(None),
            Ok(data) => Self::ok(Some(data)),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Route a parsed message to its command.
pub async fn handle_message(ctx: &AppContext, message: InboundMessage) -> MessageResponse {
    debug!(message = message.kind(), "Handling message");

    match message {
        InboundMessage::ScheduleMeetings { events } => {
            MessageResponse::from_result(commands::schedule_meetings(ctx, &events).await)
        }
        InboundMessage::RefreshNow => MessageResponse::from_result(commands::refresh_now(ctx).await),
        InboundMessage::SetPaused { paused } => {
            MessageResponse::from_result(commands::set_paused(ctx, paused).await)
        }
        InboundMessage::SkipMeeting { event, skipped } => {
            MessageResponse::from_result(commands::skip_meeting(ctx, &event, skipped).await)
        }
        InboundMessage::JoinNow { event } => {
            MessageResponse::from_result(commands::join_now(ctx, &event).await)
        }
        InboundMessage::SetEventOverride { event_id, auto_open_minutes } => {
            MessageResponse::from_result(
                commands::set_event_override(ctx, &event_id, auto_open_minutes).await,
            )
        }
        InboundMessage::AddFilter { pattern } => {
            MessageResponse::from_result(commands::add_filter(ctx, &pattern).await)
        }
        InboundMessage::RemoveFilter { pattern } => {
            MessageResponse::from_result(commands::remove_filter(ctx, &pattern).await)
        }
        InboundMessage::UpdateSettings { settings } => {
            MessageResponse::from_result(commands::update_settings(ctx, &settings).await)
        }
        InboundMessage::GetSettings => {
            MessageResponse::from_result(commands::get_settings(ctx).await)
        }
        InboundMessage::GetStatus { event } => {
            MessageResponse::from_result(commands::meeting_status(ctx, &event).await)
        }
        InboundMessage::GetPending => {
            MessageResponse::from_result(Ok(commands::pending_meetings(ctx)))
        }
    }
}

/// Parse and handle one protocol line. Malformed input yields an
/// `InvalidInput` failure response.
pub async fn handle_line(ctx: &AppContext, line: &str) -> MessageResponse {
    match serde_json::from_str::<InboundMessage>(line) {
        Ok(message) => handle_message(ctx, message).await,
        Err(err) => {
            warn!(error = %err, "Rejected malformed message");
            MessageResponse::failure(&AutoJoinError::InvalidInput(format!(
                "malformed message: {err}"
            )))
        }
    }
}

/// Answer every line from `reader` on `writer` until `reader` ends.
///
/// Blank lines are ignored and lines that are not UTF-8 get an
/// `InvalidInput` failure. Returns the number of messages answered.
pub async fn serve<R, W>(ctx: &AppContext, mut reader: R, mut writer: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut answered = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                handle_line(ctx, line).await
            }
            Err(err) => {
                warn!(error = %err, "Rejected non-UTF-8 message");
                MessageResponse::failure(&AutoJoinError::InvalidInput(format!(
                    "message is not valid UTF-8: {err}"
                )))
            }
        };
        let mut encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}
