//! Shared test helpers for `autojoin-core` integration tests.
//!
//! In-memory fakes for every core port plus event builders, so scheduler
//! tests can focus on behaviour instead of wiring.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autojoin_common::time::MockClock;
use autojoin_core::{BrowserPort, CalendarSource, KeyValueStore, MeetingScheduler, TabHandle};
use autojoin_domain::{
    AutoJoinError, CalendarEvent, ConferenceData, EntryPoint, EventStart, Result as DomainResult,
    StorageArea,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

/// In-memory mock for `KeyValueStore` with optional write failures.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<(StorageArea, String), Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, if any.
    pub fn value(&self, area: StorageArea, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(&(area, key.to_string())).cloned()
    }

    pub fn insert(&self, area: StorageArea, key: &str, value: Value) {
        self.entries.lock().unwrap().insert((area, key.to_string()), value);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AutoJoinError::Database("store is read-only".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(
        &self,
        area: StorageArea,
        keys: &[&str],
    ) -> DomainResult<HashMap<String, Value>> {
        let entries = self.entries.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|key| {
                entries.get(&(area, (*key).to_string())).map(|v| ((*key).to_string(), v.clone()))
            })
            .collect())
    }

    async fn set(&self, area: StorageArea, values: HashMap<String, Value>) -> DomainResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        for (key, value) in values {
            entries.insert((area, key), value);
        }
        Ok(())
    }

    async fn remove(&self, area: StorageArea, keys: &[&str]) -> DomainResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(&(area, (*key).to_string()));
        }
        Ok(())
    }
}

/// Browser fake that records every opened URL and focus call.
#[derive(Default, Clone)]
pub struct RecordingBrowser {
    opened: Arc<Mutex<Vec<String>>>,
    focused: Arc<Mutex<Vec<u64>>>,
    next_id: Arc<AtomicU64>,
    fail_open: Arc<AtomicBool>,
}

impl RecordingBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn focused(&self) -> usize {
        self.focused.lock().unwrap().len()
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BrowserPort for RecordingBrowser {
    async fn open_tab(&self, url: &str) -> DomainResult<TabHandle> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(AutoJoinError::Platform("no browser available".into()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(TabHandle { id, url: url.to_string() })
    }

    async fn focus_window(&self, tab: &TabHandle) -> DomainResult<()> {
        self.focused.lock().unwrap().push(tab.id);
        Ok(())
    }
}

/// Calendar fake returning a fixed event list or a fixed error.
#[derive(Clone)]
pub struct FakeCalendar {
    response: Arc<Mutex<DomainResult<Vec<CalendarEvent>>>>,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { response: Arc::new(Mutex::new(Ok(events))) }
    }

    pub fn failing(err: AutoJoinError) -> Self {
        Self { response: Arc::new(Mutex::new(Err(err))) }
    }
}

#[async_trait]
impl CalendarSource for FakeCalendar {
    async fn fetch_todays_events(&self) -> DomainResult<Vec<CalendarEvent>> {
        self.response.lock().unwrap().clone()
    }
}

/// Fixed "now" for scheduler tests: 2024-06-03T09:00:00Z.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

pub struct Harness {
    pub scheduler: MeetingScheduler,
    pub store: InMemoryStore,
    pub browser: RecordingBrowser,
    pub clock: MockClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }

    /// Build a scheduler over an existing store, as after a restart.
    pub fn with_store(store: InMemoryStore) -> Self {
        let browser = RecordingBrowser::new();
        let clock = MockClock::at(t0());
        let scheduler = MeetingScheduler::with_clock(
            Arc::new(store.clone()),
            Arc::new(browser.clone()),
            Arc::new(clock.clone()),
        );
        Self { scheduler, store, browser, clock }
    }

    /// Move both the mock wall clock and tokio's paused clock forward, then
    /// let woken timer tasks finish.
    pub async fn advance(&self, by: Duration) {
        self.clock.advance(by);
        tokio::time::sleep(by.to_std().unwrap()).await;
        settle().await;
    }
}

/// Give spawned tasks a chance to run to completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

pub fn meet_url(id: &str) -> String {
    format!("https://meet.google.com/{id}")
}

/// Event with a Google Meet conference starting at `start`.
pub fn meet_event(id: &str, summary: &str, start: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventStart::at(start.to_rfc3339(), Some("UTC")),
        description: None,
        location: None,
        conference_data: Some(ConferenceData {
            conference_id: Some(id.to_string()),
            entry_points: vec![EntryPoint {
                entry_point_type: "video".into(),
                uri: meet_url(id),
            }],
        }),
    }
}

/// Event with a Zoom link in its description.
pub fn zoom_event(id: &str, summary: &str, start: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventStart::at(start.to_rfc3339(), Some("UTC")),
        description: Some(format!("Join Zoom Meeting https://acme.zoom.us/j/{id}")),
        location: None,
        conference_data: None,
    }
}

/// Event without any joinable link.
pub fn plain_event(id: &str, summary: &str, start: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        start: EventStart::at(start.to_rfc3339(), Some("UTC")),
        description: Some("Room 4B".into()),
        location: None,
        conference_data: None,
    }
}
