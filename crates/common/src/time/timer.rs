//! Cancellable one-shot timers
//!
//! A timer is a spawned tokio task that sleeps for a delay and then runs a
//! future. Cancelling aborts the task; a cancelled timer never runs its
//! callback unless the callback had already started.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::trace;

/// A handle that can be used to cancel a pending timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl TimerHandle {
    /// Cancel the timer. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Check if the underlying task has completed (fired or aborted)
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Run `callback` once after `delay` unless cancelled first.
///
/// Must be called from within a tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use autojoin_common::time::timer::spawn_after;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_after(Duration::from_secs(5), async {
///         println!("Timeout!");
///     });
///     handle.cancel();
/// }
/// ```
pub fn spawn_after<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let task = tokio::spawn(async move {
        sleep(delay).await;
        if flag.load(Ordering::SeqCst) {
            trace!("timer cancelled before callback");
            return;
        }
        callback.await;
    });

    TimerHandle { cancelled, abort: task.abort_handle() }
}
