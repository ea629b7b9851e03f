//! # AutoJoin App
//!
//! Application layer: dependency wiring, the message protocol and the daemon
//! entry point.
//!
//! This crate contains:
//! - Application context (dependency injection, startup and shutdown)
//! - Command functions, one per user or calendar operation
//! - The newline-delimited JSON message protocol
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod messages;
pub mod utils;

// Re-export for convenience
pub use context::*;
pub use messages::{handle_line, handle_message, serve, InboundMessage, MessageResponse};
