//! Common utilities shared across AutoJoin crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: wall-clock abstractions ([`time::Clock`])
//! - `runtime`: tokio-backed one-shot timers ([`time::timer`])

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[cfg(feature = "foundation")]
pub mod time;

#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
#[cfg(feature = "runtime")]
pub use time::{spawn_after, TimerHandle};
