use std::fmt;

/// Why the client ended the session on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// A 401 arrived and no refresh token was stored.
    MissingRefreshToken,
    /// The refresh exchange failed (rejected, timed out, or unreachable).
    RefreshFailed,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutReason::MissingRefreshToken => write!(f, "no refresh token available"),
            LogoutReason::RefreshFailed => write!(f, "token refresh failed"),
        }
    }
}

/// Side effects the client asks its host to perform.
///
/// This replaces direct navigation: a terminal front end prints a hint, a GUI
/// would route to its login view.
pub trait SessionEffects: Send + Sync {
    /// The stored credentials were cleared; the user must log in again.
    /// Fired at most once per logged-in period.
    fn forced_logout(&self, reason: LogoutReason);

    /// The backend answered 403 for `path`.
    fn access_denied(&self, _path: &str) {}
}

/// Effects sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl SessionEffects for NoopEffects {
    fn forced_logout(&self, _reason: LogoutReason) {}
}
