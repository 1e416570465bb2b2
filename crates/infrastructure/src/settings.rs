//! Configuration loading.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a JSON file (`--config` / `SHOPFRONT_CONFIG`)
//! 3. `SHOPFRONT_*` environment variables named after the fields,
//!    e.g. `SHOPFRONT_TIMEOUT_MS` or `SHOPFRONT_SIGN_IN_ROUTE`
//! 4. explicit overrides from the command line
//!
//! A relative storage path is resolved against the platform data directory
//! (`~/.local/share/shopfront` on Linux).

use std::path::PathBuf;

use ::config::{Config, Environment, File, FileFormat, Map};
use shopfront_domain::{ClientConfig, DomainError};

/// Prefix of the environment variables read into `ClientConfig`.
pub const ENV_PREFIX: &str = "SHOPFRONT";

const APP_DIR: &str = "shopfront";

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not fit `ClientConfig`.
    #[error("Cannot load configuration: {0}")]
    Source(#[from] ::config::ConfigError),

    /// A value parsed but is out of range.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The assembled configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Values given explicitly by the caller, usually parsed command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// JSON file layered over the defaults. Must exist when given.
    pub config_file: Option<PathBuf>,
    /// Replaces `base_url`.
    pub base_url: Option<String>,
    /// Replaces `timeout_ms`.
    pub timeout_ms: Option<u64>,
    /// Replaces `storage_path`.
    pub storage_path: Option<PathBuf>,
}

/// Loads the configuration from `overrides` and the process environment.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or malformed, a value
/// does not fit its field, or the result fails validation.
pub fn load_config(overrides: &ConfigOverrides) -> Result<ClientConfig, ConfigError> {
    load_config_from_env(overrides, None)
}

/// Like [`load_config`], reading `SHOPFRONT_*` variables from `env` instead
/// of the process environment when it is given.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from_env(
    overrides: &ConfigOverrides,
    env: Option<Map<String, String>>,
) -> Result<ClientConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = &overrides.config_file {
        builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Json));
    }

    builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true)
                .source(env),
        )
        .set_override_option("base_url", overrides.base_url.clone())?
        .set_override_option("timeout_ms", overrides.timeout_ms)?
        .set_override_option(
            "storage_path",
            overrides
                .storage_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )?;

    let mut config: ClientConfig = builder.build()?.try_deserialize()?;

    if config.timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            name: "timeout_ms",
            value: config.timeout_ms.to_string(),
        });
    }

    config.storage_path = config.storage_path.map(resolve_storage_path);
    config.validate()?;

    tracing::debug!(
        base_url = %config.base_url,
        timeout_ms = config.timeout_ms,
        storage = ?config.storage_path,
        "configuration loaded"
    );

    Ok(config)
}

/// Anchors a relative storage path in the platform data directory.
/// Absolute paths, and relative ones on platforms without a data
/// directory, are returned unchanged.
#[must_use]
pub fn resolve_storage_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match dirs::data_dir() {
        Some(base) => base.join(APP_DIR).join(path),
        None => path,
    }
}
