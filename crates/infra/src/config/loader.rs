//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `AUTOJOIN_DB_PATH` is set
//! 2. The first config file found by [`probe_config_paths`]
//! 3. Built-in defaults
//!
//! ## Environment Variables
//! - `AUTOJOIN_DB_PATH`: Database file path (required for env loading)
//! - `AUTOJOIN_DB_POOL_SIZE`: Connection pool size
//! - `AUTOJOIN_CALENDAR_ID`: Calendar to read (default `primary`)
//! - `AUTOJOIN_CALENDAR_API_URL`: Calendar API base URL
//! - `AUTOJOIN_ACCESS_TOKEN`: OAuth bearer token
//! - `AUTOJOIN_TOKEN_FILE`: File holding the bearer token
//! - `AUTOJOIN_REFRESH_CRON`: Six-field cron expression for refreshes
//! - `AUTOJOIN_BROWSER_DRY_RUN`: Log URLs instead of opening them (true/false)
//!
//! ## File Locations
//! The loader probes `autojoin.{toml,json}` then `config.{toml,json}` in the
//! current working directory, then the same names next to the executable.

use std::path::{Path, PathBuf};

use autojoin_domain::{AutoJoinError, Config, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["autojoin.toml", "autojoin.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment first, then a probed config file, then defaults. An
/// explicitly configured source that fails to parse is an error rather
/// than a silent fallback.
///
/// # Errors
/// Returns `AutoJoinError::Config` if an environment value or the probed
/// file is invalid.
pub fn load() -> Result<Config> {
    if std::env::var_os("AUTOJOIN_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found; using defaults");
            Ok(Config::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `AUTOJOIN_DB_PATH` must be present; every other variable falls back to
/// its default when unset.
///
/// # Errors
/// Returns `AutoJoinError::Config` if the database path is missing or a
/// numeric value does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("AUTOJOIN_DB_PATH")?;
    if let Some(size) = optional_env("AUTOJOIN_DB_POOL_SIZE") {
        config.database.pool_size = size
            .parse::<u32>()
            .map_err(|e| AutoJoinError::Config(format!("Invalid pool size: {e}")))?;
    }

    if let Some(calendar_id) = optional_env("AUTOJOIN_CALENDAR_ID") {
        config.calendar.calendar_id = calendar_id;
    }
    if let Some(api_url) = optional_env("AUTOJOIN_CALENDAR_API_URL") {
        config.calendar.api_base_url = api_url;
    }
    config.calendar.access_token = optional_env("AUTOJOIN_ACCESS_TOKEN");
    config.calendar.token_file = optional_env("AUTOJOIN_TOKEN_FILE");

    if let Some(cron) = optional_env("AUTOJOIN_REFRESH_CRON") {
        config.refresh.cron_expression = cron;
    }
    config.browser.dry_run = env_bool("AUTOJOIN_BROWSER_DRY_RUN", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML (detected by file extension). Missing sections take defaults.
///
/// # Errors
/// Returns `AutoJoinError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AutoJoinError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AutoJoinError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AutoJoinError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, choosing the format from `path`'s extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AutoJoinError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AutoJoinError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AutoJoinError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Returns the first file that exists, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| AutoJoinError::Config(format!("Missing required environment variable: {key}")))
}

/// Set and non-blank
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 8] = [
        "AUTOJOIN_DB_PATH",
        "AUTOJOIN_DB_POOL_SIZE",
        "AUTOJOIN_CALENDAR_ID",
        "AUTOJOIN_CALENDAR_API_URL",
        "AUTOJOIN_ACCESS_TOKEN",
        "AUTOJOIN_TOKEN_FILE",
        "AUTOJOIN_REFRESH_CRON",
        "AUTOJOIN_BROWSER_DRY_RUN",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("AUTOJOIN_TEST_BOOL_YES", "YES");
        std::env::set_var("AUTOJOIN_TEST_BOOL_OFF", "off");
        std::env::remove_var("AUTOJOIN_TEST_BOOL_MISSING");

        assert!(env_bool("AUTOJOIN_TEST_BOOL_YES", false));
        assert!(!env_bool("AUTOJOIN_TEST_BOOL_OFF", true));
        assert!(env_bool("AUTOJOIN_TEST_BOOL_MISSING", true));

        std::env::remove_var("AUTOJOIN_TEST_BOOL_YES");
        std::env::remove_var("AUTOJOIN_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("AUTOJOIN_DB_PATH", "/tmp/autojoin-test.db");
        std::env::set_var("AUTOJOIN_DB_POOL_SIZE", "2");
        std::env::set_var("AUTOJOIN_CALENDAR_ID", "team@example.com");
        std::env::set_var("AUTOJOIN_ACCESS_TOKEN", "ya29.token");
        std::env::set_var("AUTOJOIN_REFRESH_CRON", "0 */5 * * * *");
        std::env::set_var("AUTOJOIN_BROWSER_DRY_RUN", "1");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.database.path, "/tmp/autojoin-test.db");
        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.calendar.calendar_id, "team@example.com");
        assert_eq!(config.calendar.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(config.calendar.token_file, None);
        assert_eq!(config.refresh.cron_expression, "0 */5 * * * *");
        assert!(config.refresh.run_on_start);
        assert!(config.browser.dry_run);
    }

    #[test]
    fn test_load_from_env_missing_db_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, AutoJoinError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("AUTOJOIN_DB_PATH", "/tmp/autojoin-test.db");
        std::env::set_var("AUTOJOIN_DB_POOL_SIZE", "not-a-number");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(AutoJoinError::Config(_))));
    }

    #[test]
    fn test_load_from_file_toml_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autojoin.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = "meetings.db"

[refresh]
run_on_start = false
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();

        assert_eq!(config.database.path, "meetings.db");
        assert_eq!(config.database.pool_size, 4);
        assert!(!config.refresh.run_on_start);
        assert_eq!(config.calendar.calendar_id, "primary");
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"calendar": {"token_file": "/run/secrets/gcal"}}"#).unwrap();

        let config = load_from_file(Some(path)).unwrap();

        assert_eq!(config.calendar.token_file.as_deref(), Some("/run/secrets/gcal"));
        assert_eq!(config.database.path, "autojoin.db");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/autojoin.toml")));
        assert!(matches!(result, Err(AutoJoinError::Config(_))));
    }

    #[test]
    fn test_parse_config_rejects_invalid_content() {
        assert!(parse_config(r#"{ "database": "#, Path::new("config.json")).is_err());
        assert!(parse_config("database = [", Path::new("config.toml")).is_err());
        assert!(parse_config("x: 1", Path::new("config.yaml")).is_err());
    }
}
