//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),

    /// A cart line is invalid.
    #[error("invalid cart line: {0}")]
    InvalidCartLine(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
