//! Google Calendar integration

pub mod google;
pub mod token;

pub use google::GoogleCalendarClient;
pub use token::{token_provider_from_config, AccessTokenProvider, FileTokenProvider, StaticTokenProvider};
