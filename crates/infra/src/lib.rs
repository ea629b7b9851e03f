//! # AutoJoin Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite key-value store (r2d2 pool)
//! - Google Calendar HTTP client
//! - System browser launcher
//! - Cron-driven periodic refresh
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `autojoin-core`
//! - Contains all "impure" code (I/O, HTTP, processes)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod platform;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteKeyValueStore};
pub use errors::InfraError;
pub use integrations::calendar::{
    AccessTokenProvider, FileTokenProvider, GoogleCalendarClient, StaticTokenProvider,
};
pub use platform::browser::SystemBrowser;
pub use scheduling::{RefreshScheduler, SchedulerError};
