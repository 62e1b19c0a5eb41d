//! In-memory backend.

use crate::{KeyValueStore, SecureStorage, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local storage. Nothing survives a restart.
///
/// Implements both storage traits, which makes it the backend of choice
/// for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl SecureStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().remove(key).is_some())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        SecureStorage::get(self, key)
    }

    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        SecureStorage::set(self, key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        SecureStorage::delete(self, key)
    }
}
