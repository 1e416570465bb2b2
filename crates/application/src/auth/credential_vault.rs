//! Persisted session credentials.
//!
//! Wraps the local storage port with the two credential keys so the rest
//! of the crate never deals with raw key names.

use std::sync::Arc;

use shopfront_domain::{ClientConfig, SessionTokens};

use crate::ports::{LocalStorage, StorageError};

/// Access and refresh token storage.
#[derive(Clone)]
pub struct CredentialVault {
    storage: Arc<dyn LocalStorage>,
    access_token_key: String,
    refresh_token_key: String,
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("access_token_key", &self.access_token_key)
            .field("refresh_token_key", &self.refresh_token_key)
            .finish_non_exhaustive()
    }
}

impl CredentialVault {
    /// Create a vault using the storage keys from `config`.
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>, config: &ClientConfig) -> Self {
        Self {
            storage,
            access_token_key: config.access_token_key.clone(),
            refresh_token_key: config.refresh_token_key.clone(),
        }
    }

    /// The stored access token. Empty values count as absent.
    pub async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.read(&self.access_token_key).await
    }

    /// The stored refresh token. Empty values count as absent.
    pub async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.read(&self.refresh_token_key).await
    }

    /// Overwrite the access token.
    pub async fn store_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(&self.access_token_key, token).await
    }

    /// Overwrite the refresh token.
    pub async fn store_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(&self.refresh_token_key, token).await
    }

    /// Store both tokens of a fresh session.
    pub async fn store(&self, tokens: &SessionTokens) -> Result<(), StorageError> {
        self.store_access_token(&tokens.access_token).await?;
        self.store_refresh_token(&tokens.refresh_token).await
    }

    /// Remove both tokens together.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage
            .remove_many(&[
                self.access_token_key.as_str(),
                self.refresh_token_key.as_str(),
            ])
            .await
    }

    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(key)
            .await?
            .filter(|value| !value.is_empty()))
    }
}
