//! # AutoJoin Domain
//!
//! Business domain types and models for AutoJoin.
//!
//! This crate contains:
//! - Calendar event, meeting ledger, settings and timer snapshot types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (storage keys, defaults, retention)
//!
//! ## Architecture
//! - No dependencies on other AutoJoin crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
