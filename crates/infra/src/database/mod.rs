//! SQLite persistence

pub mod kv_store_repository;
pub mod manager;

pub use kv_store_repository::SqliteKeyValueStore;
pub use manager::{DbConnection, DbManager};
