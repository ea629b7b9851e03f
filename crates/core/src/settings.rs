//! Settings repository
//!
//! Global settings live in the sync area as one key per field; per-event
//! overrides live in the local area under a single map.

use std::collections::HashMap;
use std::sync::Arc;

use autojoin_domain::constants::{
    KEY_AUTO_OPEN_MINUTES, KEY_ENABLE_MEET, KEY_ENABLE_ZOOM, KEY_EVENT_SETTINGS, KEY_IS_PAUSED,
    KEY_MEETING_FILTERS,
};
use autojoin_domain::{EventOverride, EventOverrides, Result, Settings, SettingsPatch, StorageArea};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::meeting::validate_filter;
use crate::storage::{decode_or, StoreAccessor};

const SETTINGS_KEYS: [&str; 5] =
    [KEY_ENABLE_ZOOM, KEY_ENABLE_MEET, KEY_MEETING_FILTERS, KEY_AUTO_OPEN_MINUTES, KEY_IS_PAUSED];

/// Fresh-read access to [`Settings`] and [`EventOverrides`]
#[derive(Clone)]
pub struct SettingsRepository {
    store: StoreAccessor,
    write_lock: Arc<Mutex<()>>,
}

impl SettingsRepository {
    pub fn new(store: StoreAccessor) -> Self {
        Self { store, write_lock: Arc::new(Mutex::new(())) }
    }

    /// Load the current settings, filling defaults for unset keys.
    pub async fn load(&self) -> Result<Settings> {
        let mut values = self.store.get_many(StorageArea::Sync, &SETTINGS_KEYS).await?;
        let defaults = Settings::default();
        let area = StorageArea::Sync;

        Ok(Settings {
            enable_zoom: decode_or(area, KEY_ENABLE_ZOOM, values.remove(KEY_ENABLE_ZOOM), defaults.enable_zoom),
            enable_meet: decode_or(area, KEY_ENABLE_MEET, values.remove(KEY_ENABLE_MEET), defaults.enable_meet),
            meeting_filters: decode_or(
                area,
                KEY_MEETING_FILTERS,
                values.remove(KEY_MEETING_FILTERS),
                defaults.meeting_filters,
            ),
            auto_open_minutes: decode_or(
                area,
                KEY_AUTO_OPEN_MINUTES,
                values.remove(KEY_AUTO_OPEN_MINUTES),
                defaults.auto_open_minutes,
            ),
            is_paused: decode_or(area, KEY_IS_PAUSED, values.remove(KEY_IS_PAUSED), defaults.is_paused),
        })
    }

    pub async fn is_paused(&self) -> Result<bool> {
        self.store.get_or(StorageArea::Sync, KEY_IS_PAUSED, false).await
    }

    pub async fn set_paused(&self, paused: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.set(StorageArea::Sync, KEY_IS_PAUSED, &paused).await
    }

    /// Apply a partial update and return the resulting settings.
    ///
    /// Every filter in the patch must compile; nothing is written otherwise.
    pub async fn apply(&self, patch: &SettingsPatch) -> Result<Settings> {
        if let Some(filters) = &patch.meeting_filters {
            for filter in filters {
                validate_filter(filter)?;
            }
        }

        let _guard = self.write_lock.lock().await;
        self.write_patch(patch).await?;
        self.load().await
    }

    /// Append a filter unless an identical one exists.
    pub async fn add_filter(&self, pattern: &str) -> Result<Settings> {
        validate_filter(pattern)?;

        let _guard = self.write_lock.lock().await;
        let mut filters: Vec<String> =
            self.store.get_or_default(StorageArea::Sync, KEY_MEETING_FILTERS).await?;
        if !filters.iter().any(|existing| existing == pattern) {
            filters.push(pattern.to_string());
            self.store.set(StorageArea::Sync, KEY_MEETING_FILTERS, &filters).await?;
        }
        self.load().await
    }

    pub async fn remove_filter(&self, pattern: &str) -> Result<Settings> {
        let _guard = self.write_lock.lock().await;
        let mut filters: Vec<String> =
            self.store.get_or_default(StorageArea::Sync, KEY_MEETING_FILTERS).await?;
        let before = filters.len();
        filters.retain(|existing| existing != pattern);
        if filters.len() != before {
            self.store.set(StorageArea::Sync, KEY_MEETING_FILTERS, &filters).await?;
        }
        self.load().await
    }

    pub async fn event_overrides(&self) -> Result<EventOverrides> {
        self.store.get_or_default(StorageArea::Local, KEY_EVENT_SETTINGS).await
    }

    /// Set or clear (`None`) the lead time override for one event.
    pub async fn set_event_override(&self, event_id: &str, minutes: Option<u32>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut overrides = self.event_overrides().await?;
        match minutes {
            Some(minutes) => {
                overrides.insert(
                    event_id.to_string(),
                    EventOverride { auto_open_minutes: Some(minutes) },
                );
            }
            None => {
                overrides.remove(event_id);
            }
        }
        debug!(event_id, ?minutes, "Updated event override");
        self.store.set(StorageArea::Local, KEY_EVENT_SETTINGS, &overrides).await
    }

    /// Lead time for `event_id`: its override if set, else the global value.
    pub async fn lead_minutes(&self, event_id: &str, settings: &Settings) -> Result<u32> {
        let overrides = self.event_overrides().await?;
        Ok(overrides
            .get(event_id)
            .and_then(|o| o.auto_open_minutes)
            .unwrap_or(settings.auto_open_minutes))
    }

    async fn write_patch(&self, patch: &SettingsPatch) -> Result<()> {
        let mut entries: HashMap<String, Value> = HashMap::new();
        if let Some(value) = patch.enable_zoom {
            entries.insert(KEY_ENABLE_ZOOM.to_string(), Value::Bool(value));
        }
        if let Some(value) = patch.enable_meet {
            entries.insert(KEY_ENABLE_MEET.to_string(), Value::Bool(value));
        }
        if let Some(filters) = &patch.meeting_filters {
            entries.insert(KEY_MEETING_FILTERS.to_string(), serde_json::to_value(filters)?);
        }
        if let Some(minutes) = patch.auto_open_minutes {
            entries.insert(KEY_AUTO_OPEN_MINUTES.to_string(), Value::from(minutes));
        }
        if let Some(value) = patch.is_paused {
            entries.insert(KEY_IS_PAUSED.to_string(), Value::Bool(value));
        }

        if entries.is_empty() {
            return Ok(());
        }
        self.store.set_many(StorageArea::Sync, entries).await
    }
}
