//! Session credentials and refresh coordination.
//!
//! This module provides:
//! - Persisted access/refresh token storage
//! - The single-flight gate that serializes token refreshes

mod credential_vault;
mod refresh_gate;

pub use credential_vault::CredentialVault;
pub use refresh_gate::{Admission, OutcomeReceiver, RefreshGate, RefreshOutcome};
