//! HTTP Request domain types

mod body;
mod header;
mod method;
mod spec;

pub use body::{JSON_CONTENT_TYPE, RequestBody};
pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use spec::{AUTHORIZATION_HEADER, DEFAULT_TIMEOUT_MS, RequestSpec};
