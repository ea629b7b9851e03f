//! Meeting link extraction
//!
//! Conference data wins over free-text Zoom links; only one link is ever
//! returned.

use autojoin_domain::constants::{VIDEO_ENTRY_POINT_TYPE, ZOOM_URL_PATTERN};
use autojoin_domain::{CalendarEvent, MeetingLink, MeetingPlatform, Settings};
use once_cell::sync::Lazy;
use regex::Regex;

static ZOOM_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(ZOOM_URL_PATTERN).expect("ZOOM_URL_REGEX should compile - this is a bug"));

/// Find the URL to open for `event`, honouring the platform toggles.
///
/// 1. With Meet enabled, a conference that has an identifier yields its
///    first `video` entry point.
/// 2. With Zoom enabled, the description and then the location are scanned
///    for a `zoom.us` URL.
///
/// # Examples
///
/// ```
/// use autojoin_core::extract_meeting_url;
/// use autojoin_domain::{CalendarEvent, EventStart, Settings};
///
/// let event = CalendarEvent {
///     id: "evt".into(),
///     summary: "Retro".into(),
///     start: EventStart::at("2024-06-03T09:00:00Z", None),
///     description: Some("Join: https://acme.zoom.us/j/123?pwd=x".into()),
///     location: None,
///     conference_data: None,
/// };
///
/// let link = extract_meeting_url(&event, &Settings::default()).unwrap();
/// assert_eq!(link.url, "https://acme.zoom.us/j/123?pwd=x");
/// ```
pub fn extract_meeting_url(event: &CalendarEvent, settings: &Settings) -> Option<MeetingLink> {
    if settings.enable_meet {
        if let Some(url) = conference_video_uri(event) {
            return Some(MeetingLink { url: url.to_string(), platform: MeetingPlatform::GoogleMeet });
        }
    }

    if settings.enable_zoom {
        return [event.description.as_deref(), event.location.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|text| ZOOM_URL_REGEX.find(text))
            .map(|m| MeetingLink { url: m.as_str().to_string(), platform: MeetingPlatform::Zoom });
    }

    None
}

fn conference_video_uri(event: &CalendarEvent) -> Option<&str> {
    let conference = event.conference_data.as_ref()?;
    if conference.conference_id.as_deref().map_or(true, str::is_empty) {
        return None;
    }
    conference
        .entry_points
        .iter()
        .find(|entry| entry.entry_point_type == VIDEO_ENTRY_POINT_TYPE)
        .map(|entry| entry.uri.as_str())
}
