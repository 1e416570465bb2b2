//! Session lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a session was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// The user signed out.
    UserRequested,
    /// A refresh was needed but no refresh token was stored.
    MissingRefreshToken,
    /// The refresh endpoint rejected or could not serve the refresh.
    RefreshFailed,
}

impl SignOutReason {
    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UserRequested => "Signed out",
            Self::MissingRefreshToken => "Your session is missing, please sign in",
            Self::RefreshFailed => "Your session expired, please sign in again",
        }
    }
}

/// Events emitted by the session client for whoever drives navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were installed.
    SignedIn {
        /// When the session started.
        at: DateTime<Utc>,
    },
    /// A new access token was obtained and stored.
    TokenRefreshed {
        /// Preview of the new token.
        token_preview: String,
        /// When the refresh settled.
        at: DateTime<Utc>,
    },
    /// Credentials were cleared; the UI should move to `redirect_to`.
    SignedOut {
        /// What ended the session.
        reason: SignOutReason,
        /// Client-side route of the unauthenticated entry point.
        redirect_to: String,
        /// When the session ended.
        at: DateTime<Utc>,
    },
}
