//! Startup, refresh and shutdown of the application context.

mod support;

use std::time::Duration;

use autojoin_domain::constants::KEY_LAST_TIME_ZONE;
use autojoin_domain::{AutoJoinError, StorageArea};
use support::{meet_event, FakeCalendar, TestApp};
use tokio_test::assert_ok;

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn start_runs_initial_refresh_and_arms_timers() {
    let app = TestApp::new(Some(FakeCalendar::with_events(vec![
        meet_event("standup", 30),
        meet_event("retro", 1),
    ])))
    .await;

    assert_ok!(app.ctx.start().await);
    assert!(app.ctx.is_refresh_running().await);

    let ctx = &app.ctx;
    assert!(wait_until(|| ctx.scheduler.has_pending("standup")).await);
    assert!(wait_until(|| !app.browser.opened().is_empty()).await);
    assert_eq!(app.browser.opened(), vec!["https://meet.google.com/abc-retro".to_string()]);

    assert_ok!(app.ctx.shutdown().await);
    assert!(!app.ctx.is_refresh_running().await);
    assert!(!app.ctx.scheduler.has_pending("standup"));
}

#[tokio::test]
async fn start_records_host_time_zone() {
    let app = TestApp::new(None).await;

    assert_ok!(app.ctx.start().await);

    let stored = app.ctx.store.get(StorageArea::Local, &[KEY_LAST_TIME_ZONE]).await.unwrap();
    assert!(stored.contains_key(KEY_LAST_TIME_ZONE));
    assert!(!app.ctx.is_refresh_running().await);
    assert_ok!(app.ctx.shutdown().await);
}

#[tokio::test]
async fn refresh_without_calendar_is_config_error() {
    let app = TestApp::new(None).await;

    let err = app.ctx.refresh_now().await.unwrap_err();

    assert!(matches!(err, AutoJoinError::Config(_)));
}

#[tokio::test]
async fn failed_refresh_keeps_existing_timers() {
    let app = TestApp::new(Some(FakeCalendar::failing())).await;
    app.ctx.scheduler.reschedule(&[meet_event("planning", 45)]).await.unwrap();

    let err = app.ctx.refresh_now().await.unwrap_err();

    assert!(matches!(err, AutoJoinError::Network(_)));
    assert!(app.ctx.scheduler.has_pending("planning"));
    assert_eq!(app.calendar.as_ref().unwrap().calls(), 1);
}

#[tokio::test]
async fn timers_survive_restart() {
    let first = TestApp::new(None).await;
    first.ctx.scheduler.reschedule(&[meet_event("standup", 30)]).await.unwrap();
    assert_ok!(first.ctx.shutdown().await);
    let TestApp { ctx, dir, .. } = first;
    drop(ctx);

    let second = TestApp::in_dir(dir, None).await;
    assert_ok!(second.ctx.start().await);

    assert!(second.ctx.scheduler.has_pending("standup"));
    assert_ok!(second.ctx.shutdown().await);
}
