//! Unverified JWT payload inspection.
//!
//! The client never validates signatures; it only reads `exp` to decide
//! whether a stored access token is still worth presenting.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub(crate) fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    // Some issuers keep the padding; the URL-safe engine here rejects it.
    let payload = parts[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&decoded).ok()
}

/// Returns the `exp` claim (seconds since epoch), if the token carries one.
pub fn expires_at_secs(token: &str) -> Option<u64> {
    decode_payload(token)?.get("exp")?.as_u64()
}

/// Returns the `user_id` claim, if present.
pub fn user_id(token: &str) -> Option<u64> {
    decode_payload(token)?.get("user_id")?.as_u64()
}

/// Returns the `exp` claim in milliseconds since epoch.
pub fn expires_at_ms(token: &str) -> Option<u64> {
    expires_at_secs(token).map(|secs| secs.saturating_mul(1000))
}

/// True only when an expiry is known and lies after `now_ms`. Tokens without
/// a decodable `exp` count as expired.
pub fn is_live(expires_ms: Option<u64>, now_ms: u64) -> bool {
    expires_ms.is_some_and(|exp| exp > now_ms)
}

#[cfg(test)]
pub(crate) fn test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}
