//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock wall clocks for testability
//! - **[`timer`]**: cancellable one-shot timers (feature `runtime`)

pub mod clock;
#[cfg(feature = "runtime")]
pub mod timer;

pub use clock::{Clock, MockClock, SystemClock};
#[cfg(feature = "runtime")]
pub use timer::{spawn_after, TimerHandle};
