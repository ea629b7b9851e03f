use std::time::Duration;

use autojoin_domain::{AutoJoinError, Result};
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a logical identifier such as `"meetings::join_now"`. Callers
/// must avoid forwarding sensitive values in it.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&'static str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}

/// Log a finished command from its result.
pub fn log_command_result<T>(command: &str, elapsed: Duration, result: &Result<T>) {
    match result {
        Ok(_) => log_command_execution(command, elapsed, true, None),
        Err(err) => log_command_execution(command, elapsed, false, Some(error_label(err))),
    }
}

/// Convert an `AutoJoinError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &AutoJoinError) -> &'static str {
    match error {
        AutoJoinError::Database(_) => "database",
        AutoJoinError::Config(_) => "config",
        AutoJoinError::Platform(_) => "platform",
        AutoJoinError::Network(_) => "network",
        AutoJoinError::Auth(_) => "auth",
        AutoJoinError::InvalidPattern(_) => "invalid_pattern",
        AutoJoinError::NotFound(_) => "not_found",
        AutoJoinError::InvalidInput(_) => "invalid_input",
        AutoJoinError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_labels_are_stable() {
        assert_eq!(error_label(&AutoJoinError::Auth("expired".into())), "auth");
        assert_eq!(error_label(&AutoJoinError::InvalidPattern("(".into())), "invalid_pattern");
        assert_eq!(error_label(&AutoJoinError::NotFound("event".into())), "not_found");
    }
}
