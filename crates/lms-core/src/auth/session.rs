use chrono::{DateTime, Utc};
use lms_types::User;

use super::jwt;
use super::store::StoredSession;

/// Snapshot of the authentication state, published on every commit point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub has_access: bool,
    pub has_refresh: bool,
    /// Access token expiry in milliseconds since epoch, when known.
    pub access_expires_ms: Option<u64>,
}

impl SessionState {
    pub(crate) fn from_stored(stored: &StoredSession) -> Self {
        let access_expires_ms = stored
            .access_token
            .as_deref()
            .and_then(jwt::expires_at_ms)
            .or_else(|| stored.token_expires.map(|secs| secs.saturating_mul(1000)));
        Self {
            user: stored.user.clone(),
            has_access: stored.access_token.is_some(),
            has_refresh: stored.refresh_token.is_some(),
            access_expires_ms,
        }
    }

    /// Expiry-aware check: an access token is present and not past its `exp`.
    pub fn is_authenticated_at(&self, now_ms: u64) -> bool {
        self.has_access && jwt::is_live(self.access_expires_ms, now_ms)
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(jwt::now_millis_u64())
    }

    /// A refresh token is stored, so an expired access token can still recover.
    pub fn can_refresh(&self) -> bool {
        self.has_refresh
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_expires_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(DateTime::from_timestamp_millis)
    }
}
