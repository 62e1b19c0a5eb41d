//! Typed access over a [`KeyValueStore`].
//!
//! Encoding: booleans as `"1"`/`"0"`, numbers as decimal text, objects as
//! JSON. Typed getters return `None` when the key is absent or the stored
//! text does not decode; decode failures are logged, never raised.

use crate::{KeyValueStore, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Cloneable handle to the fast key-value store.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        self.backend.get_string(key)
    }

    pub fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend.set_string(key, value)
    }

    pub fn get_bool(&self, key: &str) -> StorageResult<Option<bool>> {
        Ok(self.backend.get_string(key)?.map(|v| v == "1"))
    }

    pub fn set_bool(&self, key: &str, value: bool) -> StorageResult<()> {
        self.backend.set_string(key, if value { "1" } else { "0" })
    }

    /// Read an integer stored in base `radix`.
    pub fn get_number(&self, key: &str, radix: u32) -> StorageResult<Option<i64>> {
        Ok(self.backend.get_string(key)?.and_then(|raw| {
            i64::from_str_radix(raw.trim(), radix)
                .map_err(|e| warn!(key = %key, error = %e, "Stored value is not a number"))
                .ok()
        }))
    }

    pub fn set_number(&self, key: &str, value: i64) -> StorageResult<()> {
        self.backend.set_string(key, &value.to_string())
    }

    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        Ok(self.backend.get_string(key)?.and_then(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| warn!(key = %key, error = %e, "Stored value is not valid JSON"))
                .ok()
        }))
    }

    pub fn set_object<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.backend.set_string(key, &encoded)
    }

    /// Remove `key`. Returns whether an entry existed.
    pub fn delete(&self, key: &str) -> StorageResult<bool> {
        self.backend.remove(key)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
