//! Application error types

use shopfront_domain::DomainError;
use thiserror::Error;

use crate::ports::{HttpClientError, StorageError};

/// Errors surfaced to callers of the session client.
///
/// `Clone` because one refresh failure is delivered to every request
/// queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// An ordinary request failed in transport. Credentials are untouched.
    #[error("{0}")]
    Transport(#[from] HttpClientError),

    /// A 401 that may not trigger a refresh: the request was already
    /// replayed once, or it targeted the refresh endpoint itself.
    #[error("request to {url} was rejected as unauthorized")]
    Unauthorized {
        /// URL of the rejected request.
        url: String,
    },

    /// A refresh was needed but no refresh token was stored.
    #[error("session expired: no refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status.
    #[error("token refresh rejected with status {status}: {message}")]
    RefreshRejected {
        /// Status returned by the refresh endpoint.
        status: u16,
        /// Start of the response body.
        message: String,
    },

    /// The refresh call failed in transport.
    /// Credentials are kept; the session may recover once the network does.
    #[error("token refresh failed: {0}")]
    RefreshUnavailable(HttpClientError),

    /// The refresh endpoint answered 2xx without a usable access token.
    #[error("malformed refresh response: {0}")]
    MalformedRefreshResponse(String),

    /// Local storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A request could not be built.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The refresh task ended without reporting an outcome.
    #[error("token refresh was abandoned before it settled")]
    RefreshAbandoned,
}

impl SessionError {
    /// Returns true if this error ended the session (credentials were cleared).
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::MissingRefreshToken
                | Self::RefreshRejected { .. }
                | Self::MalformedRefreshResponse(_)
        )
    }

    /// Status code returned by the refresh endpoint, if it answered.
    #[must_use]
    pub const fn refresh_status(&self) -> Option<u16> {
        match self {
            Self::RefreshRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for session client operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ends_session() {
        assert!(SessionError::MissingRefreshToken.ends_session());
        assert!(
            !SessionError::RefreshUnavailable(HttpClientError::Timeout { timeout_ms: 10 })
                .ends_session()
        );
        assert!(!SessionError::Transport(HttpClientError::Other("x".into())).ends_session());
        assert!(
            !SessionError::Unauthorized {
                url: "http://x".into()
            }
            .ends_session()
        );
    }

    #[test]
    fn test_refresh_status() {
        let error = SessionError::RefreshRejected {
            status: 400,
            message: "invalid token".to_string(),
        };
        assert_eq!(error.refresh_status(), Some(400));
        assert_eq!(
            error.to_string(),
            "token refresh rejected with status 400: invalid token"
        );
        assert_eq!(SessionError::MissingRefreshToken.refresh_status(), None);
    }
}
