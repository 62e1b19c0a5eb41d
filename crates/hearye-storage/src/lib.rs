//! Storage capabilities for the Hear Ye client.
//!
//! Two stores with different guarantees are consumed by the session layer:
//! - [`SecureStorage`]: credential store for long-lived secrets
//!   (refresh token, identity provider tokens).
//! - [`KeyValueStore`]: fast, non-secure store for short-lived or
//!   low-sensitivity values (access token, preferences), wrapped by
//!   [`Storage`] for typed access.
//!
//! Platform keychains are provided by the host application; this crate
//! ships an in-memory backend and a JSON file backend.

mod file;
mod keys;
mod memory;
mod traits;
mod typed;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::{KeyValueStore, SecureStorage};
pub use typed::Storage;

use thiserror::Error;

/// Service name namespacing every credential entry.
pub const SERVICE_NAME: &str = "us.hearye.voting";

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
