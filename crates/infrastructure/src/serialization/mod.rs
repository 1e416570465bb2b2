//! Deterministic JSON for files written by the client.
//!
//! Keys come out sorted when the source type is a `BTreeMap`, indentation is
//! two spaces and every document ends with a newline, so the storage file
//! stays readable and diff-friendly.

mod json;

pub use json::*;
