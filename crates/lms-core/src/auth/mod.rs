//! Session credentials: storage, token inspection, refresh exchange and the
//! effects the client raises when a session ends.

mod effects;
mod exchange;
pub mod jwt;
mod session;
mod store;

pub use effects::{LogoutReason, NoopEffects, SessionEffects};
pub use exchange::{HttpRefreshExchange, REFRESH_PATH, RefreshExchange};
pub use session::SessionState;
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
