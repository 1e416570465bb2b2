//! HTTP Request body types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Content type used for JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP request body with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestBody {
    /// The content type, or `None` for an empty body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// The body content as a string
    #[serde(default)]
    pub content: String,
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            content_type: None,
            content: String::new(),
        }
    }

    /// Creates a JSON body from already encoded content.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self {
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            content: content.into(),
        }
    }

    /// Encodes `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn from_json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_string(value)
            .map(Self::json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns true if there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_type.is_none() && self.content.is_empty()
    }
}
