//! SQLite-backed key-value store.
//!
//! Implements the `KeyValueStore` port over the `kv_store` table. All
//! database operations run in `spawn_blocking` to avoid blocking the async
//! runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use autojoin_core::KeyValueStore;
use autojoin_domain::{AutoJoinError, Result as DomainResult, StorageArea};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::task::{self, JoinError};

use super::manager::{map_sql_error, DbManager};

/// SQLite-backed implementation of [`KeyValueStore`].
pub struct SqliteKeyValueStore {
    db: Arc<DbManager>,
}

impl SqliteKeyValueStore {
    /// Create a new store over a migrated database.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(
        &self,
        area: StorageArea,
        keys: &[&str],
    ) -> DomainResult<HashMap<String, Value>> {
        let db = Arc::clone(&self.db);
        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();

        task::spawn_blocking(move || -> DomainResult<HashMap<String, Value>> {
            let conn = db.get_connection()?;
            query_values(&conn, area, &keys)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set(&self, area: StorageArea, entries: HashMap<String, Value>) -> DomainResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            upsert_values(&mut conn, area, &entries)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn remove(&self, area: StorageArea, keys: &[&str]) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            delete_values(&mut conn, area, &keys)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn query_values(
    conn: &Connection,
    area: StorageArea,
    keys: &[String],
) -> DomainResult<HashMap<String, Value>> {
    let mut stmt = conn
        .prepare_cached("SELECT value FROM kv_store WHERE area = ?1 AND key = ?2")
        .map_err(map_sql_error)?;
    let area = area.to_string();

    let mut values = HashMap::with_capacity(keys.len());
    for key in keys {
        let raw: Option<String> = stmt
            .query_row(params![area, key], |row| row.get(0))
            .optional()
            .map_err(map_sql_error)?;
        if let Some(raw) = raw {
            let value = serde_json::from_str(&raw).map_err(|e| {
                AutoJoinError::Database(format!("stored value for '{key}' is not JSON: {e}"))
            })?;
            values.insert(key.clone(), value);
        }
    }
    Ok(values)
}

/// Insert or replace every entry in one transaction.
fn upsert_values(
    conn: &mut Connection,
    area: StorageArea,
    entries: &HashMap<String, Value>,
) -> DomainResult<()> {
    let now = chrono::Utc::now().timestamp();
    let area = area.to_string();
    let tx = conn.transaction().map_err(map_sql_error)?;
    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO kv_store (area, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(area, key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
            )
            .map_err(map_sql_error)?;
        for (key, value) in entries {
            stmt.execute(params![area, key, value.to_string(), now]).map_err(map_sql_error)?;
        }
    }
    tx.commit().map_err(map_sql_error)
}

fn delete_values(conn: &mut Connection, area: StorageArea, keys: &[String]) -> DomainResult<()> {
    let area = area.to_string();
    let tx = conn.transaction().map_err(map_sql_error)?;
    {
        let mut stmt = tx
            .prepare_cached("DELETE FROM kv_store WHERE area = ?1 AND key = ?2")
            .map_err(map_sql_error)?;
        for key in keys {
            stmt.execute(params![area, key]).map_err(map_sql_error)?;
        }
    }
    tx.commit().map_err(map_sql_error)
}

fn map_join_error(err: JoinError) -> AutoJoinError {
    AutoJoinError::Internal(format!("blocking database task failed: {err}"))
}
