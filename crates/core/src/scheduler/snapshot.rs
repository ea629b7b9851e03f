//! Persisted timer snapshot for restart recovery

use autojoin_domain::constants::KEY_SCHEDULED_MEETINGS;
use autojoin_domain::{PendingTimer, Result, StorageArea};
use tokio::sync::Mutex;

use crate::storage::StoreAccessor;

pub(crate) struct TimerSnapshot {
    store: StoreAccessor,
    write_lock: Mutex<()>,
}

impl TimerSnapshot {
    pub(crate) fn new(store: StoreAccessor) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub(crate) async fn load(&self) -> Result<Vec<PendingTimer>> {
        self.store.get_or_default(StorageArea::Local, KEY_SCHEDULED_MEETINGS).await
    }

    /// Write the snapshot produced by `collect`.
    ///
    /// `collect` runs under the write lock, so the last writer always stores
    /// the newest timer set.
    pub(crate) async fn write<F>(&self, collect: F) -> Result<usize>
    where
        F: FnOnce() -> Vec<PendingTimer> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let pending = collect();
        if pending.is_empty() {
            self.store.remove(StorageArea::Local, KEY_SCHEDULED_MEETINGS).await?;
        } else {
            self.store.set(StorageArea::Local, KEY_SCHEDULED_MEETINGS, &pending).await?;
        }
        Ok(pending.len())
    }

    pub(crate) async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(StorageArea::Local, KEY_SCHEDULED_MEETINGS).await
    }
}
