//! Scheduling infrastructure for automated task execution
//!
//! The refresh scheduler re-fetches today's calendar on a cron schedule and
//! hands the events to the meeting scheduler. It follows the same lifecycle
//! rules as every background task here:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod refresh_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use refresh_scheduler::{RefreshScheduler, RefreshSchedulerConfig};
