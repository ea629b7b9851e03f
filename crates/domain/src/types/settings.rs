//! User settings and per-event overrides

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_OPEN_MINUTES, DEFAULT_ENABLE_MEET, DEFAULT_ENABLE_ZOOM, DEFAULT_IS_PAUSED,
};
use crate::impl_domain_status_conversions;

/// Global user settings, stored in the sync area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enable_zoom: bool,
    pub enable_meet: bool,
    /// Case-insensitive regular expressions matched against the event title.
    pub meeting_filters: Vec<String>,
    /// Default lead time in minutes.
    pub auto_open_minutes: u32,
    /// Checked when a meeting is about to open, never when scheduling.
    pub is_paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_zoom: DEFAULT_ENABLE_ZOOM,
            enable_meet: DEFAULT_ENABLE_MEET,
            meeting_filters: Vec::new(),
            auto_open_minutes: DEFAULT_AUTO_OPEN_MINUTES,
            is_paused: DEFAULT_IS_PAUSED,
        }
    }
}

/// Partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub enable_zoom: Option<bool>,
    pub enable_meet: Option<bool>,
    pub meeting_filters: Option<Vec<String>>,
    pub auto_open_minutes: Option<u32>,
    pub is_paused: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Per-event lead time override; `None` means use the global default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOverride {
    #[serde(default)]
    pub auto_open_minutes: Option<u32>,
}

/// `eventId -> override`, stored under one local-area key
pub type EventOverrides = BTreeMap<String, EventOverride>;

/// Durable storage scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Small settings replicated across devices
    Sync,
    /// Device-local ledgers, overrides and the timer snapshot
    Local,
}

impl_domain_status_conversions!(StorageArea {
    Sync => "sync",
    Local => "local",
});
