//! Shopfront Domain - Core types
//!
//! This crate defines the domain model for the Shopfront session client:
//! request and response descriptions, session credentials, the guest cart
//! and client configuration. All types here are pure Rust with no I/O.

pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{
    RefreshRequest, RefreshResponse, RefreshedTokens, SessionEvent, SessionTokens,
    SignOutReason, token_preview,
};
pub use cart::{CartLine, GuestCart};
pub use config::ClientConfig;
pub use error::{DomainError, DomainResult};
