//! Shopfront session client - command line entry point
//!
//! Fires one GET per path given on the command line (default: the cart,
//! wishlist and orders screens) concurrently through a single
//! `SessionClient`, the way several UI containers load at once, and logs
//! the outcome of each together with any session events.
//!
//! ```text
//! SHOPFRONT_API_URL=https://shop.example.com/api shopfront /cart /orders
//! shopfront --config shopfront.json --timeout-ms 5000 /account
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use shopfront_application::{HttpClient, LocalStorage, SessionClient};
use shopfront_domain::SessionEvent;
use shopfront_infrastructure::{
    ConfigOverrides, FileLocalStorage, MemoryLocalStorage, ReqwestHttpClient, init_tracing,
    load_config,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;

/// Loads storefront screens through one shared session.
#[derive(Debug, Parser)]
#[command(name = "shopfront", version)]
struct Cli {
    /// JSON configuration file.
    #[arg(long = "config", env = "SHOPFRONT_CONFIG")]
    config_file: Option<PathBuf>,

    /// Base URL of the backend API.
    #[arg(long, env = "SHOPFRONT_API_URL")]
    api_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "SHOPFRONT_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// File backing local storage; omitted keeps tokens in memory.
    #[arg(long, env = "SHOPFRONT_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    /// API paths to load concurrently.
    #[arg(default_values = ["/cart", "/wishlist", "/orders"])]
    paths: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config_file.clone(),
            base_url: self.api_url.clone(),
            timeout_ms: self.timeout_ms,
            storage_path: self.storage_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = load_config(&cli.overrides())?;
    tracing::info!(
        base_url = %config.base_url,
        "Starting Shopfront client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let storage: Arc<dyn LocalStorage> = match &config.storage_path {
        Some(path) => Arc::new(FileLocalStorage::new(path.clone())),
        None => Arc::new(MemoryLocalStorage::new()),
    };
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let client = SessionClient::new(config, http, storage);

    let events = tokio::spawn(report_events(client.subscribe()));

    let mut calls = JoinSet::new();
    for path in cli.paths {
        let client = client.clone();
        calls.spawn(async move {
            let outcome = client.get(&path).await;
            (path, outcome)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = calls.join_next().await {
        match joined {
            Ok((path, Ok(response))) => tracing::info!(
                path = %path,
                status = response.status,
                bytes = response.body.len(),
                "request completed"
            ),
            Ok((path, Err(error))) => {
                failures += 1;
                tracing::error!(path = %path, error = %error, "request failed");
            }
            Err(error) => {
                failures += 1;
                tracing::error!(error = %error, "request task aborted");
            }
        }
    }

    // Dropping the last client closes the event channel and ends the reporter.
    drop(client);
    events.await?;

    if failures > 0 {
        return Err(format!("{failures} request(s) failed").into());
    }
    Ok(())
}

async fn report_events(mut events: tokio::sync::broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::SignedIn { .. }) => tracing::info!("signed in"),
            Ok(SessionEvent::TokenRefreshed { token_preview, .. }) => {
                tracing::info!(token = %token_preview, "access token refreshed");
            }
            Ok(SessionEvent::SignedOut {
                reason,
                redirect_to,
                ..
            }) => {
                tracing::warn!(redirect_to = %redirect_to, "{}", reason.message());
            }
            Err(RecvError::Lagged(missed)) => tracing::warn!(missed, "session events dropped"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_paths() {
        let cli = Cli::try_parse_from(["shopfront"]).unwrap();
        assert_eq!(cli.paths, vec!["/cart", "/wishlist", "/orders"]);
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "shopfront",
            "--config",
            "shopfront.json",
            "--api-url",
            "https://shop.example.com/api",
            "--timeout-ms",
            "5000",
            "--storage-path",
            "/tmp/storage.json",
            "/account",
        ])
        .unwrap();

        assert_eq!(cli.paths, vec!["/account"]);
        assert_eq!(
            cli.overrides(),
            ConfigOverrides {
                config_file: Some(PathBuf::from("shopfront.json")),
                base_url: Some("https://shop.example.com/api".to_string()),
                timeout_ms: Some(5000),
                storage_path: Some(PathBuf::from("/tmp/storage.json")),
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["shopfront", "--timeout-ms", "soon"]).is_err());
    }
}
