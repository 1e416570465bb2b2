//! In-memory storage for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shopfront_application::ports::{LocalStorage, StorageError};
use tokio::sync::RwLock;

/// Thread-safe in-memory key-value store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStorage {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryLocalStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryLocalStorage::new();
        storage.set("accessToken", "tok1").await.expect("set");

        assert_eq!(
            storage.get("accessToken").await.expect("get"),
            Some("tok1".to_string())
        );

        storage.remove("accessToken").await.expect("remove");
        assert_eq!(storage.get("accessToken").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = MemoryLocalStorage::new();
        let other = storage.clone();
        other.set("refreshToken", "r1").await.expect("set");

        assert_eq!(
            storage.get("refreshToken").await.expect("get"),
            Some("r1".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove_many_leaves_other_keys() {
        let storage = MemoryLocalStorage::new();
        storage.set("accessToken", "tok1").await.expect("set");
        storage.set("refreshToken", "r1").await.expect("set");
        storage.set("guestCart", "{}").await.expect("set");

        storage
            .remove_many(&["accessToken", "refreshToken", "missing"])
            .await
            .expect("remove_many");

        assert_eq!(storage.get("accessToken").await.expect("get"), None);
        assert_eq!(storage.get("refreshToken").await.expect("get"), None);
        assert!(storage.get("guestCart").await.expect("get").is_some());
    }
}
