//! Google Calendar events client
//!
//! Fetches the remaining events of the current local day with recurring
//! events expanded into single instances.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autojoin_common::time::{Clock, SystemClock};
use autojoin_core::CalendarSource;
use autojoin_domain::{AutoJoinError, CalendarConfig, CalendarEvent, Result};
use chrono::{DateTime, Local, NaiveTime, SecondsFormat, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::token::AccessTokenProvider;
use crate::errors::InfraError;

/// Upper bound on followed `nextPageToken` links for one fetch.
const MAX_PAGES: usize = 10;
const PAGE_SIZE: &str = "250";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

/// Google Calendar v3 client implementing [`CalendarSource`]
pub struct GoogleCalendarClient {
    client: Client,
    events_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
    clock: Arc<dyn Clock>,
}

impl GoogleCalendarClient {
    pub fn new(config: &CalendarConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        Self::with_clock(config, tokens, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &CalendarConfig,
        tokens: Arc<dyn AccessTokenProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(InfraError::from)?;
        let events_url = events_url(&config.api_base_url, &config.calendar_id)?;

        Ok(Self { client, events_url, tokens, clock })
    }

    /// Fetch single event instances starting between `time_min` and
    /// `time_max`, following pagination.
    ///
    /// Cancelled instances and items that do not parse as events are
    /// dropped with a warning instead of failing the whole fetch.
    #[instrument(skip(self), fields(url = %self.events_url))]
    pub async fn fetch_events_between(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let token = self.tokens.access_token().await?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Millis, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let mut request = self.client.get(self.events_url.clone()).bearer_auth(&token).query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("conferenceDataVersion", "1"),
                ("maxResults", PAGE_SIZE),
            ]);
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token.as_str())]);
            }

            let page: EventsPage = request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(InfraError::from)?
                .json()
                .await
                .map_err(InfraError::from)?;

            debug!(page = page_number, items = page.items.len(), "Fetched calendar page");
            events.extend(page.items.into_iter().filter_map(parse_item));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => {
                    info!(count = events.len(), "Fetched calendar events");
                    return Ok(events);
                }
            }
        }

        warn!(pages = MAX_PAGES, "Stopped following calendar pages at limit");
        Ok(events)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn fetch_todays_events(&self) -> Result<Vec<CalendarEvent>> {
        let now = self.clock.now();
        self.fetch_events_between(now, end_of_local_day(now)).await
    }
}

fn parse_item(item: serde_json::Value) -> Option<CalendarEvent> {
    if item.get("status").and_then(serde_json::Value::as_str) == Some("cancelled") {
        return None;
    }
    match serde_json::from_value::<CalendarEvent>(item) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "Ignoring malformed calendar item");
            None
        }
    }
}

fn events_url(base: &str, calendar_id: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| AutoJoinError::Config(format!("invalid calendar API base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| AutoJoinError::Config(format!("calendar API base URL {base} cannot be a base")))?
        .pop_if_empty()
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

/// Last millisecond of the host's local day containing `now`.
fn end_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let fallback = now + chrono::Duration::hours(24);
    let local_date = now.with_timezone(&Local).date_naive();
    let Some(last_moment) = NaiveTime::from_hms_milli_opt(23, 59, 59, 999) else {
        return fallback;
    };
    Local
        .from_local_datetime(&local_date.and_time(last_moment))
        .latest()
        .map_or(fallback, |end| end.with_timezone(&Utc))
}
