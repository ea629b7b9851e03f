//! Domain types and models

pub mod event;
pub mod meeting;
pub mod settings;
pub mod timer;

pub use event::{CalendarEvent, ConferenceData, EntryPoint, EventStart};
pub use meeting::{MeetingKey, MeetingLink, MeetingPlatform, MeetingRecord};
pub use settings::{EventOverride, EventOverrides, Settings, SettingsPatch, StorageArea};
pub use timer::PendingTimer;
