//! Authentication domain types

mod session;
mod types;

pub use session::{SessionEvent, SignOutReason};
pub use types::{RefreshRequest, RefreshResponse, RefreshedTokens, SessionTokens, token_preview};
