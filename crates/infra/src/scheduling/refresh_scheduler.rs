//! Periodic calendar refresh.
//!
//! Provides a cron-based scheduler that fetches today's events and hands them
//! to [`MeetingScheduler::reschedule`]. Join handles are tracked,
//! cancellation is explicit, and every asynchronous operation is wrapped in a
//! timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use autojoin_core::{CalendarSource, MeetingScheduler};
//! use autojoin_domain::RefreshConfig;
//! use autojoin_infra::scheduling::{RefreshScheduler, SchedulerResult};
//!
//! # async fn example(
//! #     meetings: MeetingScheduler,
//! #     calendar: Arc<dyn CalendarSource>,
//! # ) -> SchedulerResult<()> {
//! let mut scheduler = RefreshScheduler::new(meetings, calendar, &RefreshConfig::default());
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use autojoin_core::{CalendarSource, MeetingScheduler, RescheduleSummary};
use autojoin_domain::{AutoJoinError, RefreshConfig, Result as DomainResult};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct RefreshSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Timeout applied to a single fetch-and-reschedule run.
    pub job_timeout: Duration,
    /// Run one refresh as soon as the scheduler starts.
    pub run_on_start: bool,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for RefreshSchedulerConfig {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

impl From<&RefreshConfig> for RefreshSchedulerConfig {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            cron_expression: config.cron_expression.clone(),
            job_timeout: Duration::from_secs(config.job_timeout_secs),
            run_on_start: config.run_on_start,
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Calendar refresh scheduler with explicit lifecycle management.
pub struct RefreshScheduler {
    scheduler: Option<JobScheduler>,
    config: RefreshSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    meetings: MeetingScheduler,
    source: Arc<dyn CalendarSource>,
}

impl RefreshScheduler {
    /// Create a scheduler from the application's refresh settings.
    pub fn new(
        meetings: MeetingScheduler,
        source: Arc<dyn CalendarSource>,
        config: &RefreshConfig,
    ) -> Self {
        Self::with_config(RefreshSchedulerConfig::from(config), meetings, source)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(
        config: RefreshSchedulerConfig,
        meetings: MeetingScheduler,
        source: Arc<dyn CalendarSource>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            meetings,
            source,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?;

        start_result.map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let initial = self.config.run_on_start.then(|| {
            (self.meetings.clone(), Arc::clone(&self.source), self.config.job_timeout)
        });
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel, initial).await;
        });

        self.monitor_handle = Some(handle);
        info!("Refresh scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    ///
    /// Armed meeting timers are left alone.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?;

        stop_result.map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Refresh scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Run one refresh now, outside the cron schedule.
    pub async fn run_once(&self) -> DomainResult<RescheduleSummary> {
        perform_refresh(&self.meetings, self.source.as_ref(), self.config.job_timeout).await
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;
        let cron_expr = self.config.cron_expression.clone();
        let meetings = self.meetings.clone();
        let source = Arc::clone(&self.source);
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let meetings = meetings.clone();
            let source = Arc::clone(&source);

            Box::pin(async move {
                if let Err(err) = perform_refresh(&meetings, source.as_ref(), job_timeout).await {
                    debug!(error = %err, "Scheduled refresh did not complete");
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered refresh job");
        Ok(scheduler)
    }

    async fn monitor_task(
        cancel: CancellationToken,
        initial: Option<(MeetingScheduler, Arc<dyn CalendarSource>, Duration)>,
    ) {
        if let Some((meetings, source, job_timeout)) = initial {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Startup refresh cancelled");
                    return;
                }
                result = perform_refresh(&meetings, source.as_ref(), job_timeout) => {
                    if let Err(err) = result {
                        debug!(error = %err, "Startup refresh did not complete");
                    }
                }
            }
        }

        cancel.cancelled().await;
        debug!("Refresh scheduler monitor cancelled");
    }
}

async fn perform_refresh(
    meetings: &MeetingScheduler,
    source: &dyn CalendarSource,
    job_timeout: Duration,
) -> DomainResult<RescheduleSummary> {
    let started = Instant::now();

    match tokio::time::timeout(job_timeout, meetings.refresh(source)).await {
        Ok(Ok(summary)) => {
            debug!(
                elapsed_ms = started.elapsed().as_millis(),
                armed = summary.armed,
                opened = summary.opened,
                "Calendar refresh finished"
            );
            Ok(summary)
        }
        Ok(Err(err)) => {
            error!(error = %err, "Calendar refresh failed");
            Err(err)
        }
        Err(_) => {
            warn!(timeout_secs = job_timeout.as_secs(), "Calendar refresh timed out");
            Err(AutoJoinError::Network(format!(
                "calendar refresh timed out after {}s",
                job_timeout.as_secs()
            )))
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("RefreshScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use autojoin_core::{BrowserPort, KeyValueStore};
    use autojoin_domain::CalendarEvent;
    use tempfile::TempDir;

    use super::*;
    use crate::database::{DbManager, SqliteKeyValueStore};
    use crate::platform::SystemBrowser;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CalendarSource for CountingSource {
        async fn fetch_todays_events(&self) -> DomainResult<Vec<CalendarEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn meetings(dir: &TempDir) -> MeetingScheduler {
        let db = DbManager::new(dir.path().join("refresh.db"), 2).unwrap();
        db.run_migrations().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(Arc::new(db)));
        let browser: Arc<dyn BrowserPort> = Arc::new(SystemBrowser::new(true));
        MeetingScheduler::new(store, browser)
    }

    fn config(cron: &str, run_on_start: bool) -> RefreshSchedulerConfig {
        RefreshSchedulerConfig {
            cron_expression: cron.into(),
            job_timeout: Duration::from_secs(5),
            run_on_start,
            ..Default::default()
        }
    }

    async fn wait_for_calls(source: &CountingSource, at_least: usize) -> bool {
        for _ in 0..50 {
            if source.calls.load(Ordering::SeqCst) >= at_least {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_runs_initial_refresh_and_stop_is_clean() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(CountingSource::default());
        let mut scheduler = RefreshScheduler::with_config(
            config("0 0 0 1 1 *", true),
            meetings(&dir),
            source.clone(),
        );

        scheduler.start().await.unwrap();
        assert!(scheduler.is_running());
        assert!(wait_for_calls(&source, 1).await);

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut scheduler = RefreshScheduler::with_config(
            config("0 0 0 1 1 *", false),
            meetings(&dir),
            Arc::new(CountingSource::default()),
        );

        scheduler.start().await.unwrap();
        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, SchedulerError::AlreadyRunning));
        scheduler.stop().await.unwrap();

        assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cron_job_triggers_refresh() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(CountingSource::default());
        let mut scheduler = RefreshScheduler::with_config(
            config("*/1 * * * * *", false),
            meetings(&dir),
            source.clone(),
        );

        scheduler.start().await.unwrap();
        assert!(wait_for_calls(&source, 1).await);
        scheduler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_cron_fails_registration() {
        let dir = TempDir::new().unwrap();
        let mut scheduler = RefreshScheduler::with_config(
            config("every two minutes", false),
            meetings(&dir),
            Arc::new(CountingSource::default()),
        );

        let err = scheduler.start().await.unwrap_err();
        assert!(matches!(err, SchedulerError::JobRegistrationFailed { .. }));
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn run_once_refreshes_immediately() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(CountingSource::default());
        let scheduler =
            RefreshScheduler::with_config(config("0 */2 * * * *", false), meetings(&dir), source.clone());

        let summary = scheduler.run_once().await.unwrap();
        assert_eq!(summary.processed(), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
