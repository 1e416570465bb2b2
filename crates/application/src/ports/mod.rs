//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session client and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod http_client;
mod local_storage;

pub use http_client::{HttpClient, HttpClientError};
pub use local_storage::{LocalStorage, StorageError};
