//! Refresh-token exchange against the remote auth endpoint.

use std::time::Duration;

use futures_util::future::BoxFuture;
use lms_types::RefreshedTokens;
use tracing::debug;

use crate::config::Config;
use crate::http::{ApiError, ApiErrorKind, ApiResult};

/// Path of the refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "auth/token/refresh/";

/// Exchanges a refresh token for a new access token (and possibly a rotated
/// refresh token).
pub trait RefreshExchange: Send + Sync {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ApiResult<RefreshedTokens>>;
}

/// `POST {api_url}auth/token/refresh/` with `{"refresh": ...}`.
///
/// Uses its own reqwest client: the exchange never carries the bearer token
/// and never re-enters the refresh protocol.
#[derive(Debug, Clone)]
pub struct HttpRefreshExchange {
    http: reqwest::Client,
    url: url::Url,
    timeout: Option<Duration>,
}

impl HttpRefreshExchange {
    /// # Errors
    /// Returns an error if the refresh path cannot be joined onto `base_url`.
    pub fn new(base_url: &url::Url, timeout: Option<Duration>) -> ApiResult<Self> {
        let url = base_url.join(REFRESH_PATH).map_err(|e| {
            ApiError::new(ApiErrorKind::Transport, format!("Invalid refresh URL: {e}"))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            url,
            timeout,
        })
    }

    /// Builds the exchange from the resolved config.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base = config.resolved_api_url()?;
        Ok(Self::new(&base, config.refresh_timeout())?)
    }

    async fn exchange(&self, refresh_token: &str) -> ApiResult<RefreshedTokens> {
        debug!(url = %self.url, "refreshing access token");

        let mut request = self
            .http
            .post(self.url.clone())
            .json(&serde_json::json!({ "refresh": refresh_token }));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::refresh_rejected(status.as_u16(), &body));
        }

        response
            .json::<RefreshedTokens>()
            .await
            .map_err(|e| ApiError::decode(format!("Failed to parse refresh response: {e}")))
    }
}

impl RefreshExchange for HttpRefreshExchange {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, ApiResult<RefreshedTokens>> {
        Box::pin(self.exchange(refresh_token))
    }
}
