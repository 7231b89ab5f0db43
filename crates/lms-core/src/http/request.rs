use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::{ApiError, ApiErrorKind, ApiResult};

/// Replayable description of one outbound call.
///
/// The authenticated client rebuilds the HTTP request from this on every send,
/// so the same call can be resent after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL (a leading `/` is ignored).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the client-wide request timeout.
    pub timeout: Option<Duration>,
    /// Sent without a bearer token and never enters the refresh protocol
    /// (login, registration, token verification).
    pub anonymous: bool,
    /// Set once the request has been through the refresh protocol.
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
            anonymous: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    /// Returns a decode error if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::new(
                ApiErrorKind::Decode,
                format!("Failed to serialize request body: {e}"),
            )
        })?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Marks the request as not needing credentials.
    #[must_use]
    pub fn without_auth(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Whether this request has already been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Path with any leading slash removed, ready to join onto the base URL.
    pub(crate) fn relative_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_query_and_body() {
        let request = ApiRequest::post("/enrollments/enrollments/")
            .query("course", 3)
            .json(&serde_json::json!({"course": 3}))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.relative_path(), "enrollments/enrollments/");
        assert_eq!(request.query, vec![("course".to_string(), "3".to_string())]);
        assert_eq!(request.body, Some(serde_json::json!({"course": 3})));
        assert!(!request.is_retried());
    }
}
