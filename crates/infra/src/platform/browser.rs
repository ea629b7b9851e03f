//! System browser adapter
//!
//! Opens meeting links with the desktop's default handler via the `open`
//! crate. The OS gives no handle to the tab it creates, so tab ids are
//! process-local counters and focusing is best effort.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use autojoin_core::{BrowserPort, TabHandle};
use autojoin_domain::{AutoJoinError, Result};
use tokio::task::{self, JoinError};
use tracing::{debug, info};

/// [`BrowserPort`] backed by the operating system's URL handler
pub struct SystemBrowser {
    dry_run: bool,
    next_tab: AtomicU64,
}

impl SystemBrowser {
    /// With `dry_run` set, URLs are logged instead of launched.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run, next_tab: AtomicU64::new(1) }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl BrowserPort for SystemBrowser {
    async fn open_tab(&self, url: &str) -> Result<TabHandle> {
        let tab = TabHandle { id: self.next_tab.fetch_add(1, Ordering::Relaxed), url: url.to_string() };

        if self.dry_run {
            info!(url, tab_id = tab.id, "Dry run: not launching browser");
            return Ok(tab);
        }

        let target = url.to_string();
        task::spawn_blocking(move || open::that(&target))
            .await
            .map_err(map_join_error)?
            .map_err(|e| AutoJoinError::Platform(format!("failed to open {url}: {e}")))?;

        debug!(url, tab_id = tab.id, "Launched default browser");
        Ok(tab)
    }

    async fn focus_window(&self, tab: &TabHandle) -> Result<()> {
        // The default handler raises the window it opens into.
        debug!(tab_id = tab.id, "Focus delegated to system URL handler");
        Ok(())
    }
}

fn map_join_error(err: JoinError) -> AutoJoinError {
    if err.is_cancelled() {
        AutoJoinError::Internal("browser launch task cancelled".into())
    } else {
        AutoJoinError::Internal(format!("browser launch task failed: {err}"))
    }
}
