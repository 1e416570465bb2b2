//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{Headers, HttpMethod, RequestBody};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Complete specification for an outbound API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Unique identifier, used to correlate log lines for one call
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Timeout for this single exchange, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Set once the request has been replayed after a token refresh
    #[serde(default)]
    retried: bool,
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            url: url.into(),
            headers: Headers::new(),
            body: RequestBody::none(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retried: false,
        }
    }

    /// Creates a GET request with the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with the given URL and body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets `Authorization: Bearer <token>`, replacing any previous credential.
    pub fn set_bearer(&mut self, token: &str) {
        self.headers.set(AUTHORIZATION_HEADER, format!("Bearer {token}"));
    }

    /// Drops any attached credential so the request goes out anonymous.
    pub fn clear_bearer(&mut self) {
        self.headers.remove(AUTHORIZATION_HEADER);
    }

    /// Returns the bearer token currently attached, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|value| value.strip_prefix("Bearer "))
    }

    /// Returns true once the request has been replayed after a refresh.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as replayed so a second 401 is terminal.
    pub const fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Validates the URL and returns parsed version if valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed.
    pub fn parse_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }

    /// Returns the path component of the URL, or the raw URL if it does not parse.
    #[must_use]
    pub fn path(&self) -> String {
        self.parse_url()
            .map_or_else(|_| self.url.clone(), |url| url.path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_request() {
        let req = RequestSpec::get("https://api.example.com/cart");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!req.is_retried());
        assert_eq!(req.path(), "/cart");
    }

    #[test]
    fn test_bearer_is_replaced() {
        let mut req = RequestSpec::get("https://api.example.com/orders");
        assert_eq!(req.bearer(), None);

        req.set_bearer("tok1");
        req.set_bearer("tok2");

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.bearer(), Some("tok2"));
        assert_eq!(req.headers.get("authorization"), Some("Bearer tok2"));
    }

    #[test]
    fn test_clear_bearer() {
        let mut req = RequestSpec::get("https://api.example.com/orders");
        req.set_bearer("tok1");

        req.clear_bearer();

        assert_eq!(req.bearer(), None);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_mark_retried() {
        let mut req = RequestSpec::get("https://api.example.com/wishlist");
        req.mark_retried();
        assert!(req.is_retried());
    }
}
