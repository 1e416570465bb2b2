//! Guest cart persistence.

use std::sync::Arc;

use shopfront_domain::GuestCart;
use tracing::warn;

use crate::ports::{LocalStorage, StorageError};

/// Reads and writes the guest cart under one storage key.
#[derive(Clone)]
pub struct GuestCartStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
}

impl GuestCartStore {
    /// Create a store writing to `key`.
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>, key: String) -> Self {
        Self { storage, key }
    }

    /// Loads the cart. A missing or unreadable entry yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself fails.
    pub async fn load(&self) -> Result<GuestCart, StorageError> {
        let Some(raw) = self.storage.get(&self.key).await? else {
            return Ok(GuestCart::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "discarding unreadable guest cart");
            GuestCart::new()
        }))
    }

    /// Saves the cart, replacing the stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or written.
    pub async fn save(&self, cart: &GuestCart) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(cart).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(&self.key, &raw).await
    }

    /// Loads the cart, applies `change` and saves the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be loaded or saved.
    pub async fn update<R>(
        &self,
        change: impl FnOnce(&mut GuestCart) -> R + Send,
    ) -> Result<R, StorageError> {
        let mut cart = self.load().await?;
        let result = change(&mut cart);
        self.save(&cart).await?;
        Ok(result)
    }

    /// Removes the stored cart, e.g. after it was merged into the account cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn store(storage: &Arc<MemoryStorage>) -> GuestCartStore {
        GuestCartStore::new(storage.clone(), "guestCart".to_string())
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let cart = store(&MemoryStorage::with(&[])).load().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let storage = MemoryStorage::with(&[]);
        let carts = store(&storage);

        let added = carts
            .update(|cart| cart.add("p1", Some("m"), 2))
            .await
            .unwrap();
        assert!(added.is_ok());

        let reloaded = carts.load().await.unwrap();
        assert_eq!(reloaded.total_quantity(), 2);
        assert_eq!(
            storage.value("guestCart").as_deref(),
            Some(r#"{"items":[{"productId":"p1","variantId":"m","quantity":2}]}"#)
        );
    }

    #[tokio::test]
    async fn test_corrupt_cart_is_discarded() {
        let storage = MemoryStorage::with(&[("guestCart", "not json")]);
        let cart = store(&storage).load().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = MemoryStorage::with(&[("guestCart", r#"{"items":[]}"#)]);
        store(&storage).clear().await.unwrap();
        assert_eq!(storage.value("guestCart"), None);
    }
}
