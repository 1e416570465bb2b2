//! Local storage port
//!
//! A device-side string key-value store holding the session credentials
//! and the guest cart.

use async_trait::async_trait;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backing medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// String key-value storage.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Reads a value. Missing keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes several values.
    ///
    /// Implementations backed by a single document should override this
    /// so the keys disappear in one write.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
