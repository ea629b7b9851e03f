//! Application constants
//!
//! Storage keys keep the camelCase names the browser extension used so that a
//! ledger exported from it can be imported verbatim.

// Sync area (small, user-editable settings)
pub const KEY_ENABLE_ZOOM: &str = "enableZoom";
pub const KEY_ENABLE_MEET: &str = "enableMeet";
pub const KEY_MEETING_FILTERS: &str = "meetingFilters";
pub const KEY_AUTO_OPEN_MINUTES: &str = "autoOpenMinutes";
pub const KEY_IS_PAUSED: &str = "isPaused";

// Local area (device-local ledgers, overrides, timer snapshot)
pub const KEY_OPENED_MEETINGS: &str = "openedMeetings";
pub const KEY_SKIPPED_MEETINGS: &str = "skippedMeetings";
pub const KEY_SCHEDULED_MEETINGS: &str = "scheduledMeetings";
pub const KEY_EVENT_SETTINGS: &str = "eventSettings";
pub const KEY_LAST_TIME_ZONE: &str = "lastTimeZone";

// Settings defaults
pub const DEFAULT_ENABLE_ZOOM: bool = true;
pub const DEFAULT_ENABLE_MEET: bool = true;
pub const DEFAULT_AUTO_OPEN_MINUTES: u32 = 1;
pub const DEFAULT_IS_PAUSED: bool = false;

/// Ledger entries whose meeting started longer ago than this are pruned.
pub const LEDGER_RETENTION_HOURS: i64 = 24;

// Link extraction
pub const VIDEO_ENTRY_POINT_TYPE: &str = "video";
pub const ZOOM_URL_PATTERN: &str = r#"(?i)https://[^/]*zoom\.us/[^\s<)"]*"#;

// Periodic refresh
pub const DEFAULT_REFRESH_CRON: &str = "0 */2 * * * *";
pub const DEFAULT_REFRESH_JOB_TIMEOUT_SECS: u64 = 60;

// Google Calendar
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Database
pub const DEFAULT_DB_PATH: &str = "autojoin.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
