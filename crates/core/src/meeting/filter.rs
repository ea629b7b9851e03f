//! Title filter engine

use autojoin_domain::{AutoJoinError, CalendarEvent, Result, Settings};
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Whether `event` passes the user's title filters.
///
/// An empty filter list admits everything. Otherwise at least one filter,
/// compiled as a case-insensitive regular expression, must match the title.
/// A filter that fails to compile counts as a non-match.
pub fn is_eligible(event: &CalendarEvent, settings: &Settings) -> bool {
    if settings.meeting_filters.is_empty() {
        return true;
    }

    settings.meeting_filters.iter().any(|pattern| match compile(pattern) {
        Ok(regex) => regex.is_match(&event.summary),
        Err(err) => {
            warn!(pattern = %pattern, error = %err, "Ignoring invalid meeting filter");
            false
        }
    })
}

/// Reject a filter that would never match because it does not compile.
pub fn validate_filter(pattern: &str) -> Result<()> {
    compile(pattern).map(|_| ()).map_err(|err| AutoJoinError::InvalidPattern(format!("{pattern}: {err}")))
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
