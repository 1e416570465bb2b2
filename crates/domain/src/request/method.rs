//! Methods the session client issues.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verb of an outbound API call. The storefront API only speaks these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Reads: cart, wishlist, orders, catalogue.
    Get,
    /// Creates, and the refresh call.
    Post,
    /// Full replacement.
    Put,
    /// Partial update, e.g. a cart line quantity.
    Patch,
    /// Removal.
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
