//! Shopfront Application - Session client and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the HTTP transport and device-side storage
//! - The session client that attaches credentials and coordinates refreshes
//! - Guest cart persistence
//! - Application-level error handling

pub mod auth;
pub mod cart_store;
pub mod error;
pub mod ports;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{CredentialVault, RefreshGate};
pub use cart_store::GuestCartStore;
pub use error::{SessionError, SessionResult};
pub use ports::{HttpClient, HttpClientError, LocalStorage, StorageError};
pub use session::SessionClient;
