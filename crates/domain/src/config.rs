//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_ID, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_REFRESH_CRON,
    DEFAULT_REFRESH_JOB_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, GOOGLE_CALENDAR_API_BASE,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub calendar: CalendarConfig,
    pub refresh: RefreshConfig,
    pub browser: BrowserConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Calendar API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub api_base_url: String,
    pub calendar_id: String,
    /// Bearer token used verbatim. Takes precedence over `token_file`.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// File whose trimmed contents are re-read before every fetch.
    pub token_file: Option<String>,
    pub request_timeout_secs: u64,
}

/// Periodic refresh configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    pub job_timeout_secs: u64,
    /// Run one refresh immediately after startup instead of waiting for the
    /// first tick.
    pub run_on_start: bool,
}

/// Browser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Log URLs instead of launching the system browser.
    pub dry_run: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            access_token: None,
            token_file: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_REFRESH_CRON.to_string(),
            job_timeout_secs: DEFAULT_REFRESH_JOB_TIMEOUT_SECS,
            run_on_start: true,
        }
    }
}
