//! Typed access to the key-value store
//!
//! Every read goes to the store; nothing is cached, so edits made by other
//! writers are visible on the next access.

use std::collections::HashMap;
use std::sync::Arc;

use autojoin_domain::{Result, StorageArea};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::ports::KeyValueStore;

/// JSON (de)serialising wrapper around a [`KeyValueStore`]
#[derive(Clone)]
pub struct StoreAccessor {
    store: Arc<dyn KeyValueStore>,
}

impl StoreAccessor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read one key, falling back to `default` when it is absent.
    ///
    /// A stored document that no longer matches `T` is logged and replaced by
    /// the default rather than failing the caller.
    pub async fn get_or<T>(&self, area: StorageArea, key: &str, default: T) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let mut values = self.store.get(area, &[key]).await?;
        Ok(decode_or(area, key, values.remove(key), default))
    }

    pub async fn get_or_default<T>(&self, area: StorageArea, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        self.get_or(area, key, T::default()).await
    }

    /// Read several keys in one round trip.
    pub async fn get_many(
        &self,
        area: StorageArea,
        keys: &[&str],
    ) -> Result<HashMap<String, Value>> {
        self.store.get(area, keys).await
    }

    pub async fn set<T>(&self, area: StorageArea, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let document = serde_json::to_value(value)?;
        self.store.set(area, HashMap::from([(key.to_string(), document)])).await
    }

    /// Write several entries atomically.
    pub async fn set_many(&self, area: StorageArea, entries: HashMap<String, Value>) -> Result<()> {
        self.store.set(area, entries).await
    }

    pub async fn remove(&self, area: StorageArea, key: &str) -> Result<()> {
        self.store.remove(area, &[key]).await
    }
}

/// Decode a value fetched with [`StoreAccessor::get_many`].
pub(crate) fn decode_or<T: DeserializeOwned>(
    area: StorageArea,
    key: &str,
    value: Option<Value>,
    default: T,
) -> T {
    match value {
        None | Some(Value::Null) => default,
        Some(document) => match serde_json::from_value(document) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(%area, key, error = %err, "Stored value has unexpected shape; using default");
                default
            }
        },
    }
}
