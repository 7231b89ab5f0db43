use lms_core::auth::{LogoutReason, SessionEffects};
use tracing::debug;

pub const SESSION_EXPIRED_HINT: &str = "Session expired. Run `lms login`.";

/// Terminal stand-in for "navigate to the login screen".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalEffects;

impl SessionEffects for TerminalEffects {
    fn forced_logout(&self, reason: LogoutReason) {
        debug!(%reason, "forced logout");
        eprintln!("{SESSION_EXPIRED_HINT}");
    }

    fn access_denied(&self, path: &str) {
        debug!(path, "access denied");
    }
}
