//! Shopfront Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the application ports: a reqwest
//! transport, file and in-memory local storage, plus configuration
//! loading and tracing setup for binaries.

pub mod adapters;
pub mod settings;
pub mod serialization;
pub mod storage;
pub mod telemetry;

pub use adapters::ReqwestHttpClient;
pub use settings::{ConfigError, ConfigOverrides, load_config, load_config_from_env};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
pub use storage::{FileLocalStorage, MemoryLocalStorage};
pub use telemetry::init_tracing;
