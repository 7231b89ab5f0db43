//! Authenticated HTTP client.
//!
//! Every API call goes through [`AuthClient::send`]. It attaches the bearer
//! token, and on a 401 runs a single shared refresh exchange: the first
//! request to see the 401 owns the exchange, later ones queue behind it and
//! are resumed (or rejected) in FIFO order once it settles. A request is
//! replayed at most once.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use anyhow::Result;
use lms_types::{AuthTokens, User};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::error::{ApiError, ApiErrorKind, ApiResult};
use super::request::ApiRequest;
use crate::auth::{
    FileTokenStore, HttpRefreshExchange, LogoutReason, RefreshExchange, SessionEffects,
    SessionState, TokenStore,
};
use crate::config::Config;

const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Connection settings for [`AuthClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API base URL; always ends with `/`.
    pub base_url: url::Url,
    /// Overall timeout applied to each request unless the request sets its own.
    pub request_timeout: Option<Duration>,
    /// Attach a random `X-Request-ID` header to every request.
    pub request_id: bool,
}

impl ClientSettings {
    pub fn new(base_url: url::Url) -> Self {
        Self {
            base_url,
            request_timeout: Some(Duration::from_secs(30)),
            request_id: true,
        }
    }

    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.resolved_api_url()?,
            request_timeout: config.request_timeout(),
            request_id: config.request_id,
        })
    }
}

type Waiter = oneshot::Sender<ApiResult<String>>;

/// Shared refresh state. Only touched while the mutex is held, and the mutex
/// is never held across an await.
#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    queue: VecDeque<Waiter>,
}

enum RefreshRole {
    /// A refresh committed after the rejected token was sent.
    Current(String),
    Owner,
    Waiter(oneshot::Receiver<ApiResult<String>>),
}

/// Held by the refresh owner. Settling (or dropping) it clears the flag and
/// drains the queue in one critical section, so no request can enqueue
/// behind a refresh that has already finished.
struct RefreshGuard<'a> {
    state: &'a Mutex<RefreshState>,
    settled: bool,
}

impl RefreshGuard<'_> {
    fn settle(mut self, outcome: &ApiResult<String>) {
        self.settled = true;
        drain(self.state, outcome);
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh owner dropped before the exchange settled");
            drain(self.state, &Err(ApiError::refresh_cancelled()));
        }
    }
}

fn lock_refresh(state: &Mutex<RefreshState>) -> MutexGuard<'_, RefreshState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn drain(state: &Mutex<RefreshState>, outcome: &ApiResult<String>) {
    let waiters = {
        let mut state = lock_refresh(state);
        state.refreshing = false;
        std::mem::take(&mut state.queue)
    };
    if !waiters.is_empty() {
        debug!(count = waiters.len(), ok = outcome.is_ok(), "resolving queued requests");
    }
    for waiter in waiters {
        // Closed receiver: that caller gave up.
        let _ = waiter.send(outcome.clone());
    }
}

/// Gateway for all outbound API calls.
pub struct AuthClient {
    http: reqwest::Client,
    settings: ClientSettings,
    store: Arc<dyn TokenStore>,
    exchange: Arc<dyn RefreshExchange>,
    effects: Arc<dyn SessionEffects>,
    /// Default outbound credential. Written only at commit points.
    bearer: RwLock<Option<String>>,
    refresh: Mutex<RefreshState>,
    logout_signalled: AtomicBool,
    session_tx: watch::Sender<SessionState>,
}

impl AuthClient {
    pub fn new(
        settings: ClientSettings,
        store: Arc<dyn TokenStore>,
        exchange: Arc<dyn RefreshExchange>,
        effects: Arc<dyn SessionEffects>,
    ) -> Self {
        let stored = store.snapshot();
        let (session_tx, _) = watch::channel(SessionState::from_stored(&stored));
        Self {
            http: reqwest::Client::new(),
            settings,
            store,
            exchange,
            effects,
            bearer: RwLock::new(stored.access_token),
            refresh: Mutex::new(RefreshState::default()),
            logout_signalled: AtomicBool::new(false),
            session_tx,
        }
    }

    /// Wires the file-backed token store and the HTTP refresh exchange.
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the session file is unreadable.
    pub fn from_config(config: &Config, effects: Arc<dyn SessionEffects>) -> Result<Self> {
        let settings = ClientSettings::from_config(config)?;
        let store = Arc::new(FileTokenStore::open_default()?);
        let exchange = Arc::new(HttpRefreshExchange::from_config(config)?);
        Ok(Self::new(settings, store, exchange, effects))
    }

    pub fn base_url(&self) -> &url::Url {
        &self.settings.base_url
    }

    /// Sends a request with transparent recovery from access-token expiry.
    ///
    /// Any status other than 401 is returned as the response. A 401 runs the
    /// refresh protocol and replays the request once; a second 401 (or any
    /// 401 on an anonymous request) fails with [`ApiErrorKind::Unauthorized`].
    ///
    /// # Errors
    /// Transport failures, timeouts, unrecoverable 401s and refresh failures.
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<Response> {
        let mut token = if request.anonymous {
            None
        } else {
            self.bearer()
        };
        loop {
            let response = self.execute(&request, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(self.inspect(&request, response));
            }

            if request.anonymous || request.retried {
                if request.retried {
                    warn!(path = %request.path, "still unauthorized after token refresh");
                }
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::http_status(401, &body));
            }

            request.retried = true;
            debug!(path = %request.path, "access token rejected");
            token = Some(self.fresh_token(token.as_deref()).await?);
        }
    }

    /// Sends and decodes a JSON success body; non-2xx statuses become errors.
    ///
    /// # Errors
    /// Everything [`AuthClient::send`] returns, non-success statuses, and decode failures.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.send_checked(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::decode(format!("Failed to parse response: {e}")))
    }

    /// Sends and discards the body; non-2xx statuses become errors.
    ///
    /// # Errors
    /// Everything [`AuthClient::send`] returns and non-success statuses.
    pub async fn send_empty(&self, request: ApiRequest) -> ApiResult<()> {
        self.send_checked(request).await.map(|_| ())
    }

    async fn send_checked(&self, request: ApiRequest) -> ApiResult<Response> {
        let response = self.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::http_status(status.as_u16(), &body))
    }

    /// Commits a login/registration: stores the pair and profile, updates the
    /// default credential and re-arms the forced-logout effect.
    ///
    /// # Errors
    /// Returns a storage error if the token store cannot be written.
    pub fn establish_session(&self, tokens: &AuthTokens, user: &User) -> ApiResult<()> {
        self.commit_tokens(&tokens.access, Some(&tokens.refresh))?;
        self.store.save_user(user).map_err(|e| ApiError::storage(&e))?;
        self.publish();
        info!(user_id = user.id, "session established");
        Ok(())
    }

    /// Refreshes the cached profile.
    ///
    /// # Errors
    /// Returns a storage error if the token store cannot be written.
    pub fn cache_user(&self, user: &User) -> ApiResult<()> {
        self.store.save_user(user).map_err(|e| ApiError::storage(&e))?;
        self.publish();
        Ok(())
    }

    /// Marks an explicit logout in progress. A refresh failure from here on
    /// still clears the session but does not raise the forced-logout effect.
    pub fn begin_logout(&self) {
        self.logout_signalled.store(true, Ordering::SeqCst);
    }

    /// Explicit logout: clears every stored key. Does not raise the
    /// forced-logout effect.
    ///
    /// # Errors
    /// Returns a storage error if the token store cannot be cleared.
    pub fn logout(&self) -> ApiResult<()> {
        self.logout_signalled.store(true, Ordering::SeqCst);
        *self.write_bearer() = None;
        let cleared = self.store.clear().map_err(|e| ApiError::storage(&e));
        self.publish();
        info!("logged out");
        cleared
    }

    /// Current authentication snapshot.
    pub fn session(&self) -> SessionState {
        self.session_tx.borrow().clone()
    }

    /// Receiver that observes every commit point (login, refresh, logout).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.user()
    }

    /// Stored refresh token (for the server-side logout call).
    pub fn stored_refresh_token(&self) -> Option<String> {
        self.store.refresh_token()
    }

    /// Whether a refresh exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        lock_refresh(&self.refresh).refreshing
    }

    fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_bearer(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.bearer.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn execute(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<Response> {
        let url = self
            .settings
            .base_url
            .join(request.relative_path())
            .map_err(|e| {
                ApiError::new(
                    ApiErrorKind::Transport,
                    format!("Invalid request path '{}': {e}", request.path),
                )
            })?;

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if self.settings.request_id {
            builder = builder.header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string());
        }
        if let Some(timeout) = request.timeout.or(self.settings.request_timeout) {
            builder = builder.timeout(timeout);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            retried = request.retried,
            "sending request"
        );

        builder.send().await.map_err(|e| {
            let err = ApiError::from_reqwest(&e);
            warn!(path = %request.path, kind = %err.kind, "request failed without a response");
            err
        })
    }

    fn inspect(&self, request: &ApiRequest, response: Response) -> Response {
        if response.status() == StatusCode::FORBIDDEN {
            warn!(path = %request.path, "access denied");
            self.effects.access_denied(&request.path);
        }
        response
    }

    /// Returns an access token newer than `rejected`: the one a refresh has
    /// already committed, the one from the exchange in flight, or a new one
    /// from running the exchange.
    async fn fresh_token(&self, rejected: Option<&str>) -> ApiResult<String> {
        let role = {
            let mut state = lock_refresh(&self.refresh);
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.queue.push_back(tx);
                RefreshRole::Waiter(rx)
            } else {
                match self.bearer() {
                    Some(current) if Some(current.as_str()) != rejected => {
                        RefreshRole::Current(current)
                    }
                    _ => {
                        state.refreshing = true;
                        RefreshRole::Owner
                    }
                }
            }
        };

        match role {
            RefreshRole::Current(token) => {
                debug!("access token already refreshed; replaying");
                Ok(token)
            }
            RefreshRole::Waiter(rx) => {
                debug!("waiting for in-flight token refresh");
                rx.await.unwrap_or_else(|_| Err(ApiError::refresh_cancelled()))
            }
            RefreshRole::Owner => {
                let guard = RefreshGuard {
                    state: &self.refresh,
                    settled: false,
                };
                let outcome = self.exchange_and_commit().await;
                guard.settle(&outcome);
                outcome
            }
        }
    }

    async fn exchange_and_commit(&self) -> ApiResult<String> {
        let Some(refresh_token) = self.store.refresh_token() else {
            warn!("no refresh token stored");
            self.force_logout(LogoutReason::MissingRefreshToken);
            return Err(ApiError::missing_refresh_token().with_session_ended());
        };

        info!("refreshing access token");
        match self.exchange.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.commit_tokens(&tokens.access, tokens.refresh.as_deref())?;
                self.publish();
                info!(rotated = tokens.refresh.is_some(), "token refresh committed");
                Ok(tokens.access)
            }
            Err(err) => {
                warn!(kind = %err.kind, error = %err, "token refresh failed");
                self.force_logout(LogoutReason::RefreshFailed);
                Err(err.with_session_ended())
            }
        }
    }

    /// Persists the pair, then swaps the default credential.
    fn commit_tokens(&self, access: &str, refresh: Option<&str>) -> ApiResult<()> {
        self.store
            .save_tokens(access, refresh)
            .map_err(|e| ApiError::storage(&e))?;
        *self.write_bearer() = Some(access.to_string());
        self.logout_signalled.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn force_logout(&self, reason: LogoutReason) {
        *self.write_bearer() = None;
        if let Err(err) = self.store.clear() {
            warn!(error = %format!("{err:#}"), "failed to clear token store");
        }
        self.publish();

        if !self.logout_signalled.swap(true, Ordering::SeqCst) {
            warn!(%reason, "session ended; login required");
            self.effects.forced_logout(reason);
        }
    }

    fn publish(&self) {
        self.session_tx
            .send_replace(SessionState::from_stored(&self.store.snapshot()));
    }
}

impl fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.settings.base_url.as_str())
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_resolves_waiters_in_order_and_resets_flag() {
        let state = Mutex::new(RefreshState {
            refreshing: true,
            queue: VecDeque::new(),
        });
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = oneshot::channel();
            lock_refresh(&state).queue.push_back(tx);
            receivers.push(rx);
        }

        drain(&state, &Ok("T2".to_string()));

        assert!(!lock_refresh(&state).refreshing);
        assert!(lock_refresh(&state).queue.is_empty());
        for rx in receivers {
            assert_eq!(rx.await.unwrap().unwrap(), "T2");
        }
    }

    #[tokio::test]
    async fn test_dropped_guard_rejects_queue() {
        let state = Mutex::new(RefreshState::default());
        lock_refresh(&state).refreshing = true;
        let (tx, rx) = oneshot::channel();
        lock_refresh(&state).queue.push_back(tx);

        drop(RefreshGuard {
            state: &state,
            settled: false,
        });

        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::RefreshCancelled);
        assert!(!lock_refresh(&state).refreshing);
    }
}
