//! Meeting link extraction and title filtering

pub mod filter;
pub mod link;

pub use filter::{is_eligible, validate_filter};
pub use link::extract_meeting_url;
