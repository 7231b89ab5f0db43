//! Error type for API calls made through the authenticated client.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of API errors for consistent handling by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No response was received (connection refused, DNS, TLS, reset)
    Transport,
    /// The request or the refresh exchange exceeded its timeout
    Timeout,
    /// 401 on a request that was already replayed once
    Unauthorized,
    /// 403 from the backend
    Forbidden,
    /// Any other non-success status
    HttpStatus,
    /// A 401 arrived but no refresh token was stored
    MissingRefreshToken,
    /// The refresh endpoint answered with a non-success status
    RefreshRejected,
    /// The request owning the refresh was dropped before the exchange settled
    RefreshCancelled,
    /// The response body did not match the expected shape
    Decode,
    /// The token store could not be read or written
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::Transport => "transport",
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::Forbidden => "forbidden",
            ApiErrorKind::HttpStatus => "http_status",
            ApiErrorKind::MissingRefreshToken => "missing_refresh_token",
            ApiErrorKind::RefreshRejected => "refresh_rejected",
            ApiErrorKind::RefreshCancelled => "refresh_cancelled",
            ApiErrorKind::Decode => "decode",
            ApiErrorKind::Storage => "storage",
        };
        f.write_str(label)
    }
}

/// Structured API error. `Clone` so a single refresh failure can be handed to
/// every caller that was queued behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
    /// HTTP status when a response was received
    pub status: Option<u16>,
    /// Set when this failure forced the session to log out
    #[serde(default)]
    pub session_ended: bool,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            status: None,
            session_ended: false,
        }
    }

    /// Creates an HTTP status error, extracting a readable message from the body.
    ///
    /// Understands the backend's `{"detail": ..}`, `{"error": ..}` and
    /// `{"field": ["msg", ..]}` shapes.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            _ => ApiErrorKind::HttpStatus,
        };
        let message = match extract_message(body) {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind,
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
            status: Some(status),
            session_ended: false,
        }
    }

    /// Maps a reqwest failure (no usable response) to a transport or timeout error.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout(format!("Request timed out: {err}"));
        }
        if err.is_decode() {
            return Self::decode(format!("Failed to decode response: {err}"));
        }
        let mut error = Self::new(ApiErrorKind::Transport, format!("Network error: {err}"));
        error.status = err.status().map(|s| s.as_u16());
        error
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(ApiErrorKind::Storage, format!("Token store error: {err:#}"))
    }

    pub fn missing_refresh_token() -> Self {
        Self::new(
            ApiErrorKind::MissingRefreshToken,
            "Session expired: no refresh token available",
        )
    }

    pub fn refresh_rejected(status: u16, body: &str) -> Self {
        let base = Self::http_status(status, body);
        Self {
            kind: ApiErrorKind::RefreshRejected,
            message: format!("Session expired: token refresh rejected ({})", base.message),
            ..base
        }
    }

    pub fn refresh_cancelled() -> Self {
        Self::new(
            ApiErrorKind::RefreshCancelled,
            "Token refresh was abandoned before it completed",
        )
    }

    /// Marks the error as the cause of a forced logout.
    #[must_use]
    pub fn with_session_ended(mut self) -> Self {
        self.session_ended = true;
        self
    }

    /// True when this failure ended the session (forced logout was triggered).
    pub fn is_session_expired(&self) -> bool {
        self.session_ended
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "error", "message"] {
        if let Some(msg) = json.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }

    // DRF validation errors: {"field": ["msg", ...]} or {"non_field_errors": [..]}
    let object = json.as_object()?;
    let messages: Vec<String> = object
        .iter()
        .filter_map(|(field, value)| {
            let first = match value {
                Value::Array(items) => items.first().and_then(Value::as_str),
                Value::String(s) => Some(s.as_str()),
                _ => None,
            }?;
            Some(if field == "non_field_errors" {
                first.to_string()
            } else {
                format!("{field}: {first}")
            })
        })
        .collect();
    (!messages.is_empty()).then(|| messages.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_uses_detail() {
        let err = ApiError::http_status(404, r#"{"detail": "Not found."}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: Not found.");
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn test_http_status_joins_field_errors() {
        let err = ApiError::http_status(
            400,
            r#"{"non_field_errors": ["Unable to log in with provided credentials."]}"#,
        );
        assert_eq!(
            err.message,
            "HTTP 400: Unable to log in with provided credentials."
        );

        let err = ApiError::http_status(400, r#"{"username": ["This field is required."]}"#);
        assert_eq!(err.message, "HTTP 400: username: This field is required.");
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = ApiError::http_status(502, "Bad Gateway");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn test_status_kinds() {
        assert_eq!(ApiError::http_status(401, "").kind, ApiErrorKind::Unauthorized);
        assert_eq!(ApiError::http_status(403, "").kind, ApiErrorKind::Forbidden);
        assert!(ApiError::http_status(401, "").details.is_none());
    }

    #[test]
    fn test_refresh_rejected_keeps_status() {
        let err = ApiError::refresh_rejected(401, r#"{"detail": "Token is blacklisted"}"#);
        assert_eq!(err.kind, ApiErrorKind::RefreshRejected);
        assert_eq!(err.status, Some(401));
        assert!(err.message.contains("Token is blacklisted"));
        assert!(!err.is_session_expired());
        assert!(err.with_session_ended().is_session_expired());
    }
}
