#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autojoin_common::time::MockClock;
use autojoin_core::{BrowserPort, CalendarSource, TabHandle};
use autojoin_domain::{AutoJoinError, CalendarEvent, Config, Result};
use autojoin_lib::AppContext;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
}

impl RecordingBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("browser mutex poisoned").clone()
    }
}

#[async_trait]
impl BrowserPort for RecordingBrowser {
    async fn open_tab(&self, url: &str) -> Result<TabHandle> {
        let mut opened = self.opened.lock().expect("browser mutex poisoned");
        opened.push(url.to_string());
        Ok(TabHandle { id: opened.len() as u64, url: url.to_string() })
    }

    async fn focus_window(&self, _tab: &TabHandle) -> Result<()> {
        Ok(())
    }
}

/// Calendar fake returning a fixed list, or failing when `events` is `None`.
pub struct FakeCalendar {
    events: Option<Vec<CalendarEvent>>,
    calls: AtomicUsize,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { events: Some(events), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { events: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarSource for FakeCalendar {
    async fn fetch_todays_events(&self) -> Result<Vec<CalendarEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.clone().ok_or_else(|| AutoJoinError::Network("calendar unreachable".into()))
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

pub fn meet_event(id: &str, minutes_from_t0: i64) -> CalendarEvent {
    serde_json::from_value(meet_event_json(id, minutes_from_t0)).expect("event should deserialize")
}

pub fn meet_event_json(id: &str, minutes_from_t0: i64) -> serde_json::Value {
    let start = (t0() + Duration::minutes(minutes_from_t0)).to_rfc3339();
    serde_json::json!({
        "id": id,
        "summary": format!("Meeting {id}"),
        "start": { "dateTime": start, "timeZone": "UTC" },
        "conferenceData": {
            "conferenceId": format!("abc-{id}"),
            "entryPoints": [
                { "entryPointType": "video", "uri": format!("https://meet.google.com/abc-{id}") }
            ]
        }
    })
}

/// An application context over a temporary database and fake adapters.
pub struct TestApp {
    pub ctx: AppContext,
    pub browser: Arc<RecordingBrowser>,
    pub calendar: Option<Arc<FakeCalendar>>,
    pub clock: MockClock,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new(calendar: Option<FakeCalendar>) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        Self::in_dir(dir, calendar).await
    }

    /// Build over an existing directory, as a restarted process would.
    pub async fn in_dir(dir: TempDir, calendar: Option<FakeCalendar>) -> Self {
        let mut config = Config::default();
        config.database.path = dir.path().join("autojoin.db").display().to_string();
        config.database.pool_size = 2;
        // Far-off schedule so only the startup refresh runs during a test.
        config.refresh.cron_expression = "0 0 0 1 1 *".into();

        let browser = Arc::new(RecordingBrowser::default());
        let calendar = calendar.map(Arc::new);
        let clock = MockClock::at(t0());
        let ctx = AppContext::with_adapters(
            config,
            browser.clone(),
            calendar.clone().map(|c| c as Arc<dyn CalendarSource>),
            Arc::new(clock.clone()),
        )
        .await
        .expect("context should build");

        Self { ctx, browser, calendar, clock, dir }
    }
}
