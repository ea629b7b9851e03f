#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autojoin_common::time::MockClock;
use autojoin_core::{BrowserPort, KeyValueStore, MeetingScheduler, TabHandle};
use autojoin_domain::{CalendarEvent, Result};
use autojoin_infra::database::{DbManager, SqliteKeyValueStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

/// Temporary on-disk database that lives as long as the wrapper.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(temp_dir.path().join("autojoin.db"), 2).expect("db manager should open");
        manager.run_migrations().expect("migrations should apply");
        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(SqliteKeyValueStore::new(Arc::clone(&self.manager)))
    }

    /// A scheduler over this database, as a fresh process would build it.
    pub fn scheduler(&self, browser: Arc<RecordingBrowser>, clock: &MockClock) -> MeetingScheduler {
        MeetingScheduler::with_clock(self.store(), browser, Arc::new(clock.clone()))
    }
}

/// Browser fake that records every opened URL.
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

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

/// A Google Meet event starting `minutes_from_t0` after [`t0`].
pub fn meet_event(id: &str, minutes_from_t0: i64) -> CalendarEvent {
    let start = (t0() + Duration::minutes(minutes_from_t0)).to_rfc3339();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "summary": format!("Meeting {id}"),
        "start": { "dateTime": start, "timeZone": "UTC" },
        "conferenceData": {
            "conferenceId": format!("abc-{id}"),
            "entryPoints": [
                { "entryPointType": "video", "uri": format!("https://meet.google.com/abc-{id}") }
            ]
        }
    }))
    .expect("event json should deserialize")
}
