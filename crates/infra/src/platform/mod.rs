//! Platform adapters
//!
//! Host integrations that sit behind core ports. Opening a meeting goes
//! through the operating system's default URL handler, which works the same
//! on macOS, Windows and Linux desktops.

pub mod browser;

pub use browser::SystemBrowser;
