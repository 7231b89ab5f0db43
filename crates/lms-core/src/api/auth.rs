//! Login, registration, profile and logout.

use lms_types::{
    AuthResponse, LoginCredentials, MessageResponse, RegisterData, TokenVerification, User,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::jwt;
use crate::http::{ApiError, ApiErrorKind, ApiRequest, ApiResult, AuthClient};

/// Logs in and commits the returned session.
///
/// # Errors
/// Returns the backend's error when the credentials are rejected.
pub async fn login(client: &AuthClient, credentials: &LoginCredentials) -> ApiResult<User> {
    let request = ApiRequest::post("auth/login/").without_auth().json(credentials)?;
    commit(client, request).await
}

/// Logs in through the admin endpoint. A non-admin account is refused and
/// nothing is stored.
///
/// # Errors
/// Returns a forbidden error for non-admin accounts, or the backend's error.
pub async fn admin_login(client: &AuthClient, credentials: &LoginCredentials) -> ApiResult<User> {
    let request = ApiRequest::post("auth/admin/login/")
        .without_auth()
        .json(credentials)?;
    let response: AuthResponse = client.send_json(request).await?;
    if !response.user.is_admin {
        warn!(user_id = response.user.id, "admin login refused for non-admin account");
        return Err(ApiError::new(
            ApiErrorKind::Forbidden,
            "Access denied. Admin privileges required.",
        ));
    }
    client.establish_session(&response.tokens(), &response.user)?;
    Ok(response.user)
}

/// Registers a learner account and commits the returned session.
///
/// # Errors
/// Returns the backend's validation errors.
pub async fn register(client: &AuthClient, data: &RegisterData) -> ApiResult<User> {
    let request = ApiRequest::post("auth/register/").without_auth().json(data)?;
    commit(client, request).await
}

/// Registers an admin account and commits the returned session.
///
/// # Errors
/// Returns the backend's validation errors.
pub async fn admin_register(client: &AuthClient, data: &RegisterData) -> ApiResult<User> {
    let request = ApiRequest::post("auth/admin/register/")
        .without_auth()
        .json(data)?;
    commit(client, request).await
}

async fn commit(client: &AuthClient, request: ApiRequest) -> ApiResult<User> {
    let response: AuthResponse = client.send_json(request).await?;
    client.establish_session(&response.tokens(), &response.user)?;
    Ok(response.user)
}

/// Asks the backend whether `token` is valid. A 401 means "not valid".
///
/// # Errors
/// Transport failures and statuses other than 2xx/401.
pub async fn verify_token(client: &AuthClient, token: &str) -> ApiResult<TokenVerification> {
    let request = ApiRequest::post("auth/token/verify/")
        .without_auth()
        .json(&serde_json::json!({ "token": token }))?;
    match client.send_empty(request).await {
        Ok(()) => Ok(TokenVerification {
            valid: true,
            user_id: jwt::user_id(token),
        }),
        Err(err) if err.kind == ApiErrorKind::Unauthorized => Ok(TokenVerification {
            valid: false,
            user_id: None,
        }),
        Err(err) => Err(err),
    }
}

/// Blacklists the refresh token server-side, then clears the local session.
/// The local session is cleared even when the server call fails.
///
/// # Errors
/// Returns a storage error if the local session cannot be cleared.
pub async fn logout(client: &AuthClient) -> ApiResult<()> {
    client.begin_logout();
    if let Some(refresh) = client.stored_refresh_token() {
        let request =
            ApiRequest::post("auth/logout/").json(&serde_json::json!({ "refresh": refresh }))?;
        if let Err(err) = client.send_empty(request).await {
            warn!(error = %err, "server-side logout failed; clearing local session anyway");
        }
    }
    client.logout()
}

/// Revokes every session of the current user, then clears the local one.
///
/// # Errors
/// Returns a storage error if the local session cannot be cleared.
pub async fn logout_all(client: &AuthClient) -> ApiResult<MessageResponse> {
    client.begin_logout();
    let result = client
        .send_json::<MessageResponse>(ApiRequest::post("auth/logout/all/"))
        .await;
    client.logout()?;
    result
}

/// Fetches the profile and refreshes the cached copy.
///
/// # Errors
/// Any API error, including a session that could not be recovered.
pub async fn profile(client: &AuthClient) -> ApiResult<User> {
    let user: User = client.send_json(ApiRequest::get("auth/profile/")).await?;
    client.cache_user(&user)?;
    Ok(user)
}

/// Updates profile fields (partial JSON object) and caches the result.
///
/// # Errors
/// Any API error, including validation errors.
pub async fn update_profile(client: &AuthClient, fields: &Value) -> ApiResult<User> {
    let user: User = client
        .send_json(ApiRequest::put("auth/profile/").json(fields)?)
        .await?;
    client.cache_user(&user)?;
    Ok(user)
}

/// Startup check: validates the stored session by fetching the profile.
///
/// Returns `None` when there is no session or it could not be recovered
/// (the client has already run the refresh protocol and cleared it).
///
/// # Errors
/// Transport and server errors, which leave the stored session untouched.
pub async fn restore_session(client: &AuthClient) -> ApiResult<Option<User>> {
    let session = client.session();
    if !session.has_access && !session.has_refresh {
        return Ok(None);
    }

    match profile(client).await {
        Ok(user) => {
            info!(user_id = user.id, "session restored");
            Ok(Some(user))
        }
        Err(err) if err.is_session_expired() || err.kind == ApiErrorKind::Unauthorized => {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
