//! Authenticated API client with coordinated token refresh.
//!
//! Every request goes out with the stored access token. When the backend
//! answers 401, exactly one refresh call is made no matter how many
//! requests failed at the same time; the rest wait on the [`RefreshGate`]
//! and are replayed with the new token, or all fail with the refresh error.
//!
//! # Example
//!
//! ```ignore
//! let client = SessionClient::new(config, Arc::new(http), Arc::new(storage));
//! client.sign_in(SessionTokens::new(access, refresh)).await?;
//!
//! let (cart, wishlist) = tokio::join!(client.get("/cart"), client.get("/wishlist"));
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use shopfront_domain::{
    ClientConfig, RefreshRequest, RefreshResponse, SessionEvent, SessionTokens, SignOutReason,
    request::{HttpMethod, RequestBody, RequestSpec},
    response::ResponseSpec,
    token_preview,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auth::{Admission, CredentialVault, OutcomeReceiver, RefreshGate, RefreshOutcome};
use crate::cart_store::GuestCartStore;
use crate::error::{SessionError, SessionResult};
use crate::ports::{HttpClient, LocalStorage};

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Longest slice of a refresh error body kept in [`SessionError::RefreshRejected`].
const MAX_ERROR_BODY: usize = 200;

/// Session-scoped API client. Cheap to clone; clones share one refresh gate.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
    storage: Arc<dyn LocalStorage>,
    vault: CredentialVault,
    gate: RefreshGate,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.inner.config.base_url)
            .field("refreshing", &self.inner.gate.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Creates a client for one session. Construct it once and pass clones
    /// to whatever issues requests.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        let vault = CredentialVault::new(Arc::clone(&storage), &config);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                config,
                http,
                storage,
                vault,
                gate: RefreshGate::new(),
                events,
            }),
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Subscribe to sign-in, refresh and sign-out events.
    ///
    /// A `SignedOut` event carries the route the UI should navigate to.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Guest cart persisted in the same local storage.
    #[must_use]
    pub fn guest_cart(&self) -> GuestCartStore {
        GuestCartStore::new(
            Arc::clone(&self.inner.storage),
            self.inner.config.guest_cart_key.clone(),
        )
    }

    /// Returns true while a refresh call is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_refreshing()
    }

    /// Returns true if an access token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be read.
    pub async fn is_authenticated(&self) -> SessionResult<bool> {
        Ok(self.inner.vault.access_token().await?.is_some())
    }

    /// Installs the tokens returned by a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens cannot be stored.
    pub async fn sign_in(&self, tokens: SessionTokens) -> SessionResult<()> {
        self.inner.vault.store(&tokens).await?;
        self.inner.gate.advance();
        info!(token = %token_preview(&tokens.access_token), "session started");
        self.inner.emit(SessionEvent::SignedIn { at: Utc::now() });
        Ok(())
    }

    /// Clears both tokens and signals the unauthenticated state.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be cleared.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.inner.vault.clear().await?;
        self.inner.gate.advance();
        info!("session ended by user");
        self.inner.emit_signed_out(SignOutReason::UserRequested);
        Ok(())
    }

    /// Builds a request for `path` relative to the configured base URL.
    #[must_use]
    pub fn request(&self, method: HttpMethod, path: &str) -> RequestSpec {
        RequestSpec::new(method, self.inner.config.endpoint(path))
            .with_timeout_ms(self.inner.config.timeout_ms)
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::send`].
    pub async fn get(&self, path: &str) -> SessionResult<ResponseSpec> {
        self.send(self.request(HttpMethod::Get, path)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::send`].
    pub async fn delete(&self, path: &str) -> SessionResult<ResponseSpec> {
        self.send(self.request(HttpMethod::Delete, path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded; otherwise see [`SessionClient::send`].
    pub async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> SessionResult<ResponseSpec> {
        self.send_json(HttpMethod::Post, path, body).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded; otherwise see [`SessionClient::send`].
    pub async fn put_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> SessionResult<ResponseSpec> {
        self.send_json(HttpMethod::Put, path, body).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded; otherwise see [`SessionClient::send`].
    pub async fn patch_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> SessionResult<ResponseSpec> {
        self.send_json(HttpMethod::Patch, path, body).await
    }

    async fn send_json<T: Serialize + Sync>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> SessionResult<ResponseSpec> {
        let body = RequestBody::from_json(body)?;
        self.send(self.request(method, path).with_body(body)).await
    }

    /// Sets `Authorization: Bearer <token>` if an access token is stored.
    ///
    /// A missing token, or storage that cannot be read, sends the request
    /// unauthenticated and drops any credential it already carried; the
    /// backend then answers 401. Returns whether a token was attached.
    pub async fn attach_token(&self, request: &mut RequestSpec) -> bool {
        match self.inner.vault.access_token().await {
            Ok(Some(token)) => {
                request.set_bearer(&token);
                true
            }
            Ok(None) => {
                debug!(request_id = %request.id, "no access token stored");
                request.clear_bearer();
                false
            }
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "could not read access token");
                request.clear_bearer();
                false
            }
        }
    }

    /// Sends a request with the stored credential.
    ///
    /// Responses of any status other than 401 are returned unchanged,
    /// 5xx included. A 401 goes through the refresh flow once.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Transport`] when the request itself fails;
    /// - [`SessionError::Unauthorized`] for a 401 on a replayed request or
    ///   on the refresh endpoint;
    /// - the refresh error shared by the whole batch when the refresh fails.
    pub async fn send(&self, mut request: RequestSpec) -> SessionResult<ResponseSpec> {
        let epoch = self.inner.gate.epoch();
        self.attach_token(&mut request).await;

        let response = self.inner.http.execute(&request).await?;
        if response.is_server_error() {
            warn!(request_id = %request.id, status = %response.status_code(), "server error");
        }
        if !response.is_unauthorized() {
            return Ok(response);
        }

        if self.inner.config.is_refresh_url(&request.url) {
            debug!(request_id = %request.id, "refresh endpoint answered 401, not refreshing");
            return Err(SessionError::Unauthorized { url: request.url });
        }
        if request.is_retried() {
            debug!(request_id = %request.id, "401 on a replayed request");
            return Err(SessionError::Unauthorized { url: request.url });
        }

        self.handle_unauthorized(request, epoch).await
    }

    /// Runs the refresh-and-replay cycle for a request rejected with 401.
    ///
    /// A request whose credentials changed while it was in flight replays
    /// with the current token. If the session ended meanwhile there is no
    /// token to replay with, so it joins the refresh flow again, which
    /// fails without a network call once the refresh token is gone.
    async fn handle_unauthorized(
        &self,
        mut request: RequestSpec,
        mut seen_epoch: u64,
    ) -> SessionResult<ResponseSpec> {
        request.mark_retried();

        let token = loop {
            match self.inner.gate.admit(seen_epoch) {
                Admission::Lead(outcome) => {
                    debug!(request_id = %request.id, "access token rejected, starting refresh");
                    self.spawn_refresh();
                    break Self::await_outcome(outcome).await?;
                }
                Admission::Follow(outcome) => {
                    debug!(request_id = %request.id, "refresh in flight, queueing request");
                    break Self::await_outcome(outcome).await?;
                }
                Admission::Stale => {
                    if let Some(token) = self.inner.vault.access_token().await? {
                        debug!(request_id = %request.id, "credentials changed, replaying");
                        break token;
                    }
                    debug!(request_id = %request.id, "no credentials left to replay with");
                    seen_epoch = self.inner.gate.epoch();
                }
            }
        };
        request.set_bearer(&token);

        let response = self.inner.http.execute(&request).await?;
        if response.is_unauthorized() {
            return Err(SessionError::Unauthorized { url: request.url });
        }
        Ok(response)
    }

    async fn await_outcome(outcome: OutcomeReceiver) -> SessionResult<String> {
        outcome.await.map_err(|_| SessionError::RefreshAbandoned)?
    }

    /// Runs the refresh on its own task so that callers giving up early
    /// cannot leave the gate closed.
    fn spawn_refresh(&self) {
        let mut settle = SettleOnDrop {
            inner: Arc::clone(&self.inner),
            settled: false,
        };
        tokio::spawn(async move {
            let outcome = settle.inner.refresh().await;
            match &outcome {
                Err(error) if error.ends_session() => {
                    let reason = if matches!(error, SessionError::MissingRefreshToken) {
                        SignOutReason::MissingRefreshToken
                    } else {
                        SignOutReason::RefreshFailed
                    };
                    warn!(error = %error, "token refresh failed, ending session");
                    settle.inner.end_session(reason).await;
                }
                Err(error) => warn!(error = %error, "token refresh failed, keeping credentials"),
                Ok(_) => {}
            }
            settle.settle(&outcome);
        });
    }
}

impl Inner {
    /// Exchanges the refresh token for a new access token and stores it.
    async fn refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.vault.refresh_token().await? else {
            return Err(SessionError::MissingRefreshToken);
        };

        let body = RequestBody::from_json(&RefreshRequest { refresh_token })?;
        let request = RequestSpec::post(self.config.refresh_url(), body)
            .with_timeout_ms(self.config.timeout_ms);

        let response = self
            .http
            .execute(&request)
            .await
            .map_err(SessionError::RefreshUnavailable)?;

        if !response.is_success() {
            let message: String = response.text().chars().take(MAX_ERROR_BODY).collect();
            return Err(SessionError::RefreshRejected {
                status: response.status,
                message,
            });
        }

        let tokens = response
            .json_body::<RefreshResponse>()
            .map_err(|e| SessionError::MalformedRefreshResponse(e.to_string()))?
            .data;
        if tokens.access_token.is_empty() {
            return Err(SessionError::MalformedRefreshResponse(
                "empty access token".to_string(),
            ));
        }

        self.vault.store_access_token(&tokens.access_token).await?;
        if let Some(rotated) = tokens.refresh_token.as_deref() {
            self.vault.store_refresh_token(rotated).await?;
        }

        let preview = token_preview(&tokens.access_token);
        info!(token = %preview, rotated = tokens.refresh_token.is_some(), "access token refreshed");
        self.emit(SessionEvent::TokenRefreshed {
            token_preview: preview,
            at: Utc::now(),
        });
        Ok(tokens.access_token)
    }

    /// Clears credentials after an unrecoverable refresh failure.
    async fn end_session(&self, reason: SignOutReason) {
        if let Err(e) = self.vault.clear().await {
            warn!(error = %e, "could not clear stored credentials");
        }
        self.emit_signed_out(reason);
    }

    fn emit_signed_out(&self, reason: SignOutReason) {
        self.emit(SessionEvent::SignedOut {
            reason,
            redirect_to: self.config.sign_in_route.clone(),
            at: Utc::now(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Settles the gate exactly once, even if the refresh task is cancelled
/// or panics.
struct SettleOnDrop {
    inner: Arc<Inner>,
    settled: bool,
}

impl SettleOnDrop {
    fn settle(&mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        let released = self.inner.gate.settle(outcome);
        debug!(released, ok = outcome.is_ok(), "refresh settled");
    }
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(&Err(SessionError::RefreshAbandoned));
        }
    }
}
