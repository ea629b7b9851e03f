//! Port interfaces implemented by infrastructure adapters

use std::collections::HashMap;

use async_trait::async_trait;
use autojoin_domain::{CalendarEvent, Result, StorageArea};
use serde_json::Value;

/// Durable key-value storage with two scopes.
///
/// Values are JSON documents. Implementations must make `set` of several
/// entries atomic within one area.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Keys with no stored value are absent from the
    /// returned map.
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Insert or replace every entry.
    async fn set(&self, area: StorageArea, entries: HashMap<String, Value>) -> Result<()>;

    /// Delete the given keys. Missing keys are ignored.
    async fn remove(&self, area: StorageArea, keys: &[&str]) -> Result<()>;
}

/// Handle to a browser tab opened through [`BrowserPort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabHandle {
    pub id: u64,
    pub url: String,
}

/// Browser tab and window control
#[async_trait]
pub trait BrowserPort: Send + Sync {
    /// Open `url` in a new foreground tab.
    async fn open_tab(&self, url: &str) -> Result<TabHandle>;

    /// Bring the window holding `tab` to the front.
    async fn focus_window(&self, tab: &TabHandle) -> Result<()>;
}

/// Source of today's calendar events
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events from now until the end of the local day, recurring events
    /// expanded, ordered by start time.
    ///
    /// Fails with `Auth` when no usable token exists and `Network` when the
    /// request itself fails.
    async fn fetch_todays_events(&self) -> Result<Vec<CalendarEvent>>;
}
