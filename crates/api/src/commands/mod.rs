//! Command functions - one per operation the message protocol exposes

mod meetings;
mod settings;

pub use meetings::*;
pub use settings::*;
