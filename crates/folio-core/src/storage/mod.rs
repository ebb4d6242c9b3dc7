//! Key-value persistence for documents and editing history.
//!
//! Values are opaque strings (JSON in practice). Callers own the key scheme;
//! history uses one slot per document id.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A storage backend.
pub trait Storage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Load the value under `key`. Missing keys are [`StorageError::NotFound`].
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all stored keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, key: &str) -> StorageResult<bool>;
}
