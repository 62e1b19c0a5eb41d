//! Storage trait definitions.

use crate::StorageResult;

/// Trait for secure credential backends.
pub trait SecureStorage: Send + Sync {
    /// Store a value securely
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether an entry existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Trait for fast key-value backends holding string values.
///
/// Typed access (booleans, numbers, JSON objects) is layered on top by
/// [`Storage`](crate::Storage).
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the raw string stored under `key`.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a raw string under `key`, replacing any previous value.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Returns whether an entry existed.
    fn remove(&self, key: &str) -> StorageResult<bool>;
}
