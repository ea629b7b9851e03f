//! Opened/skipped meeting ledger
//!
//! Both ledgers are lists of [`MeetingRecord`] in the local area. Membership
//! is decided by [`MeetingKey`]; every mutation is a read-modify-write
//! serialised by one lock so concurrent writers never drop each other's
//! entries.

use std::sync::Arc;

use autojoin_domain::constants::{KEY_OPENED_MEETINGS, KEY_SKIPPED_MEETINGS};
use autojoin_domain::{MeetingKey, MeetingRecord, Result, StorageArea};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::storage::StoreAccessor;

/// Durable record of meetings already opened or skipped by the user
#[derive(Clone)]
pub struct MeetingLedger {
    store: StoreAccessor,
    write_lock: Arc<Mutex<()>>,
}

impl MeetingLedger {
    pub fn new(store: StoreAccessor) -> Self {
        Self { store, write_lock: Arc::new(Mutex::new(())) }
    }

    pub async fn opened(&self) -> Result<Vec<MeetingRecord>> {
        self.read(KEY_OPENED_MEETINGS).await
    }

    pub async fn skipped(&self) -> Result<Vec<MeetingRecord>> {
        self.read(KEY_SKIPPED_MEETINGS).await
    }

    pub async fn has_been_opened(&self, key: &MeetingKey) -> Result<bool> {
        Ok(self.opened().await?.iter().any(|record| record.matches(key)))
    }

    pub async fn is_skipped(&self, key: &MeetingKey) -> Result<bool> {
        Ok(self.skipped().await?.iter().any(|record| record.matches(key)))
    }

    /// Record `record` as opened. Returns `false` if its key was already
    /// present, in which case nothing is written.
    pub async fn mark_opened(&self, record: &MeetingRecord) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut opened = self.opened().await?;
        let key = record.key();
        if opened.iter().any(|existing| existing.matches(&key)) {
            return Ok(false);
        }

        opened.push(record.clone());
        self.store.set(StorageArea::Local, KEY_OPENED_MEETINGS, &opened).await?;
        debug!(event_id = %record.id, start_time = record.start_time, "Marked meeting opened");
        Ok(true)
    }

    /// Add or remove the skip mark for `record`'s key.
    pub async fn set_skipped(&self, record: &MeetingRecord, skipped: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.skipped().await?;
        let key = record.key();
        let present = entries.iter().any(|existing| existing.matches(&key));

        match (skipped, present) {
            (true, false) => entries.push(record.clone()),
            (false, true) => entries.retain(|existing| !existing.matches(&key)),
            _ => return Ok(()),
        }

        self.store.set(StorageArea::Local, KEY_SKIPPED_MEETINGS, &entries).await?;
        debug!(event_id = %record.id, skipped, "Updated skip mark");
        Ok(())
    }

    /// Drop opened entries starting at or before `cutoff`.
    pub async fn prune_opened_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.prune(KEY_OPENED_MEETINGS, cutoff).await
    }

    /// Drop skipped entries starting at or before `cutoff`.
    pub async fn prune_skipped_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.prune(KEY_SKIPPED_MEETINGS, cutoff).await
    }

    /// Prune both ledgers with the same cutoff.
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let opened = self.prune_opened_older_than(cutoff).await?;
        let skipped = self.prune_skipped_older_than(cutoff).await?;
        Ok(opened + skipped)
    }

    async fn read(&self, key: &str) -> Result<Vec<MeetingRecord>> {
        self.store.get_or_default(StorageArea::Local, key).await
    }

    async fn prune(&self, key: &str, cutoff: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read(key).await?;
        let cutoff_ms = cutoff.timestamp_millis();
        let before = entries.len();
        entries.retain(|record| record.start_time > cutoff_ms);

        let removed = before - entries.len();
        if removed > 0 {
            self.store.set(StorageArea::Local, key, &entries).await?;
            debug!(key, removed, "Pruned ledger entries");
        }
        Ok(removed)
    }
}
