//! Application context - dependency injection container

use std::sync::Arc;

use autojoin_common::time::{Clock, SystemClock};
use autojoin_core::{
    BrowserPort, CalendarSource, KeyValueStore, MeetingActions, MeetingScheduler,
    RescheduleSummary,
};
use autojoin_domain::{AutoJoinError, Config, Result};
use autojoin_infra::integrations::calendar::token_provider_from_config;
use autojoin_infra::{DbManager, GoogleCalendarClient, RefreshScheduler, SqliteKeyValueStore, SystemBrowser};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub store: Arc<dyn KeyValueStore>,
    pub scheduler: MeetingScheduler,
    pub actions: MeetingActions,
    /// `None` when no calendar credentials are configured; events then only
    /// arrive through `SCHEDULE_MEETINGS` messages.
    pub calendar: Option<Arc<dyn CalendarSource>>,
    refresh: Mutex<Option<RefreshScheduler>>,
}

impl AppContext {
    /// Build the context with the production adapters.
    pub async fn new(config: Config) -> Result<Self> {
        let browser: Arc<dyn BrowserPort> = Arc::new(SystemBrowser::new(config.browser.dry_run));
        let calendar = match token_provider_from_config(&config.calendar) {
            Some(tokens) => {
                let client = GoogleCalendarClient::new(&config.calendar, tokens)?;
                Some(Arc::new(client) as Arc<dyn CalendarSource>)
            }
            None => {
                warn!("No calendar access token configured; periodic refresh disabled");
                None
            }
        };

        Self::with_adapters(config, browser, calendar, Arc::new(SystemClock)).await
    }

    /// Build the context around caller-supplied browser, calendar and clock.
    pub async fn with_adapters(
        config: Config,
        browser: Arc<dyn BrowserPort>,
        calendar: Option<Arc<dyn CalendarSource>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;
        info!(path = %db.path().display(), "Database ready");

        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(Arc::clone(&db)));
        let scheduler = MeetingScheduler::with_clock(Arc::clone(&store), browser, clock);
        let actions = MeetingActions::new(scheduler.clone());

        Ok(Self {
            config,
            db,
            store,
            scheduler,
            actions,
            calendar,
            refresh: Mutex::new(None),
        })
    }

    /// Record the host zone, re-arm persisted timers and start the periodic
    /// refresh.
    pub async fn start(&self) -> Result<()> {
        self.actions.record_host_time_zone(&host_time_zone()).await?;

        let restored = self.scheduler.restore_pending().await?;
        info!(restored = restored.restored, dropped = restored.dropped, "Restored meeting timers");

        if let Some(calendar) = &self.calendar {
            let mut refresh = RefreshScheduler::new(
                self.scheduler.clone(),
                Arc::clone(calendar),
                &self.config.refresh,
            );
            refresh.start().await?;
            *self.refresh.lock().await = Some(refresh);
        }

        info!("AutoJoin started");
        Ok(())
    }

    /// Fetch today's events now and reschedule.
    pub async fn refresh_now(&self) -> Result<RescheduleSummary> {
        let calendar = self.calendar.as_ref().ok_or_else(|| {
            AutoJoinError::Config("no calendar access token configured".into())
        })?;
        self.scheduler.refresh(calendar.as_ref()).await
    }

    pub async fn is_refresh_running(&self) -> bool {
        self.refresh.lock().await.as_ref().is_some_and(RefreshScheduler::is_running)
    }

    /// Stop the refresh scheduler and cancel timers. The timer snapshot is
    /// kept so the next start can restore it.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(mut refresh) = self.refresh.lock().await.take() {
            refresh.stop().await?;
        }
        self.scheduler.shutdown();
        info!("AutoJoin stopped");
        Ok(())
    }
}

/// The host's IANA zone name from `TZ`, or `UTC`.
pub fn host_time_zone() -> String {
    std::env::var("TZ")
        .ok()
        .map(|zone| zone.trim().trim_start_matches(':').to_string())
        .filter(|zone| !zone.is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}
