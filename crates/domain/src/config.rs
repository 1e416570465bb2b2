//! Client configuration
//!
//! Everything the session client needs to know about the backend and
//! the device-side storage layout.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::DEFAULT_TIMEOUT_MS;

/// Configuration for the storefront API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend API, e.g. `https://shop.example.com/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every request, refresh included.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Path of the refresh endpoint, relative to `base_url`.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Client-side route of the unauthenticated entry point.
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,

    /// Storage key of the access token.
    #[serde(default = "default_access_token_key")]
    pub access_token_key: String,

    /// Storage key of the refresh token.
    #[serde(default = "default_refresh_token_key")]
    pub refresh_token_key: String,

    /// Storage key of the guest cart.
    #[serde(default = "default_guest_cart_key")]
    pub guest_cart_key: String,

    /// File backing local storage. `None` keeps everything in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_sign_in_route() -> String {
    "/login".to_string()
}

fn default_access_token_key() -> String {
    "accessToken".to_string()
}

fn default_refresh_token_key() -> String {
    "refreshToken".to_string()
}

fn default_guest_cart_key() -> String {
    "guestCart".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            refresh_path: default_refresh_path(),
            sign_in_route: default_sign_in_route(),
            access_token_key: default_access_token_key(),
            refresh_token_key: default_refresh_token_key(),
            guest_cart_key: default_guest_cart_key(),
            storage_path: None,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration pointing at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` onto the base URL. Absolute URLs are returned as is.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Absolute URL of the refresh endpoint.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        self.endpoint(&self.refresh_path)
    }

    /// Returns true if `url` targets the refresh endpoint.
    ///
    /// Query strings and trailing slashes are ignored.
    #[must_use]
    pub fn is_refresh_url(&self, url: &str) -> bool {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        without_query.trim_end_matches('/') == self.refresh_url().trim_end_matches('/')
    }

    /// Checks the values that cannot be defaulted sensibly.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn validate(&self) -> DomainResult<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "base URL must use http or https: {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.refresh_path, "/auth/refresh");
        assert_eq!(config.sign_in_route, "/login");
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = ClientConfig::with_base_url("https://shop.example.com/api/");
        assert_eq!(config.endpoint("/cart"), "https://shop.example.com/api/cart");
        assert_eq!(config.endpoint("orders"), "https://shop.example.com/api/orders");
        assert_eq!(
            config.endpoint("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_is_refresh_url() {
        let config = ClientConfig::with_base_url("https://shop.example.com/api");
        assert!(config.is_refresh_url("https://shop.example.com/api/auth/refresh"));
        assert!(config.is_refresh_url("https://shop.example.com/api/auth/refresh/?x=1"));
        assert!(!config.is_refresh_url("https://shop.example.com/api/auth/login"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://shop.example.com/api"}"#)
                .unwrap_or_default();
        assert_eq!(config.base_url, "https://shop.example.com/api");
        assert_eq!(config.access_token_key, "accessToken");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::with_base_url("ftp://shop.example.com");
        assert!(config.validate().is_err());
        let config = ClientConfig::with_base_url("not a url");
        assert!(config.validate().is_err());
    }
}
