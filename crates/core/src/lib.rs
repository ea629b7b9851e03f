//! # AutoJoin Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for storage, browser and calendar
//! - Link extraction and title filtering
//! - The opened/skipped meeting ledger
//! - The meeting scheduler and its restart snapshot
//! - User-initiated actions (skip, join now, overrides, pause)
//!
//! ## Architecture Principles
//! - Only depends on `autojoin-common` and `autojoin-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod actions;
pub mod ledger;
pub mod meeting;
pub mod ports;
pub mod scheduler;
pub mod settings;
pub mod storage;

pub use actions::{MeetingActions, MeetingStatus};
pub use ledger::MeetingLedger;
pub use meeting::{extract_meeting_url, is_eligible, validate_filter};
pub use ports::{BrowserPort, CalendarSource, KeyValueStore, TabHandle};
pub use scheduler::{EventOutcome, MeetingScheduler, RescheduleSummary, RestoreSummary};
pub use settings::SettingsRepository;
pub use storage::StoreAccessor;
