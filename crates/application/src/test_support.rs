//! In-process fakes shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shopfront_domain::{
    ClientConfig, RefreshRequest, request::RequestSpec, response::ResponseSpec,
};

use crate::ports::{HttpClient, HttpClientError, LocalStorage, StorageError};

pub const BASE_URL: &str = "https://shop.test/api";

pub fn config() -> ClientConfig {
    ClientConfig::with_base_url(BASE_URL)
}

/// Hash-map storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with(entries: &[(&str, &str)]) -> Arc<Self> {
        let storage = Self::default();
        {
            let mut values = storage.values.lock();
            for (key, value) in entries {
                values.insert((*key).to_string(), (*value).to_string());
            }
        }
        Arc::new(storage)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// What the fake refresh endpoint answers.
#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    /// 200 with `{ data: { accessToken } }`; the token becomes the valid one.
    Issue(String),
    /// 200 with a token the backend then refuses anyway.
    Unaccepted(String),
    /// 200 with a rotated refresh token as well.
    Rotate { access: String, refresh: String },
    /// A bare status code with a short error body.
    Status(u16),
    /// 200 with a body lacking `data.accessToken`.
    Garbage,
    /// Transport failure.
    Fail(HttpClientError),
}

/// Backend that accepts exactly one access token and serves a refresh endpoint.
pub struct FakeBackend {
    valid_token: Mutex<String>,
    refresh: Mutex<RefreshBehavior>,
    refresh_delay: Duration,
    path_delays: Mutex<HashMap<String, Duration>>,
    path_statuses: Mutex<HashMap<String, u16>>,
    refresh_calls: AtomicUsize,
    log: Mutex<Vec<RequestSpec>>,
}

impl FakeBackend {
    pub fn new(valid_token: &str, refresh: RefreshBehavior) -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh: Mutex::new(refresh),
            refresh_delay: Duration::from_millis(50),
            path_delays: Mutex::new(HashMap::new()),
            path_statuses: Mutex::new(HashMap::new()),
            refresh_calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Holds the answer for `path` (as seen by the server, e.g. `/api/cart`).
    pub fn delay_path(&self, path: &str, delay: Duration) {
        self.path_delays.lock().insert(path.to_string(), delay);
    }

    /// Answers `path` with `status` whatever the credential.
    pub fn answer_path(&self, path: &str, status: u16) {
        self.path_statuses.lock().insert(path.to_string(), status);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Every request received, refresh calls included, in arrival order.
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.log.lock().clone()
    }

    /// Number of requests received for `path`.
    pub fn requests_to(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path() == path).count()
    }

    /// Non-refresh requests that carried `token`.
    pub fn requests_with_bearer(&self, token: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| !r.url.ends_with("/auth/refresh") && r.bearer() == Some(token))
            .map(|r| r.path())
            .collect()
    }

    fn serve_refresh(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let body: RefreshRequest = serde_json::from_str(&request.body.content)
            .map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
        assert!(!body.refresh_token.is_empty());

        match self.refresh.lock().clone() {
            RefreshBehavior::Issue(token) => {
                (*self.valid_token.lock()).clone_from(&token);
                Ok(ResponseSpec::json(
                    200,
                    &serde_json::json!({ "data": { "accessToken": token } }),
                ))
            }
            RefreshBehavior::Unaccepted(token) => Ok(ResponseSpec::json(
                200,
                &serde_json::json!({ "data": { "accessToken": token } }),
            )),
            RefreshBehavior::Rotate { access, refresh } => {
                (*self.valid_token.lock()).clone_from(&access);
                Ok(ResponseSpec::json(
                    200,
                    &serde_json::json!({ "data": { "accessToken": access, "refreshToken": refresh } }),
                ))
            }
            RefreshBehavior::Status(status) => Ok(ResponseSpec::json(
                status,
                &serde_json::json!({ "message": "refresh token invalid" }),
            )),
            RefreshBehavior::Garbage => {
                Ok(ResponseSpec::json(200, &serde_json::json!({ "ok": true })))
            }
            RefreshBehavior::Fail(error) => Err(error),
        }
    }

    fn serve(&self, request: &RequestSpec) -> ResponseSpec {
        if let Some(status) = self.path_statuses.lock().get(&request.path()).copied() {
            return ResponseSpec::json(status, &serde_json::json!({ "message": "upstream" }));
        }
        if request.bearer() == Some(self.valid_token.lock().as_str()) {
            ResponseSpec::json(200, &serde_json::json!({ "path": request.path() }))
        } else {
            ResponseSpec::json(401, &serde_json::json!({ "message": "jwt expired" }))
        }
    }
}

impl HttpClient for FakeBackend {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + '_>> {
        let request = request.clone();
        Box::pin(async move {
            self.log.lock().push(request.clone());
            if request.url.ends_with("/auth/refresh") {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.refresh_delay).await;
                self.serve_refresh(&request)
            } else {
                let delay = self.path_delays.lock().get(&request.path()).copied();
                match delay {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => tokio::task::yield_now().await,
                }
                Ok(self.serve(&request))
            }
        })
    }
}
