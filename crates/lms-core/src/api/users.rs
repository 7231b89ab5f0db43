//! Account management. Everything except the caller's own profile needs an
//! admin session.

use lms_types::{MessageResponse, NewUser, Paginated, PasswordChange, User, UserQuery};
use serde_json::{Value, json};

use crate::http::{ApiRequest, ApiResult, AuthClient};

const USERS: &str = "users/";

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn list(client: &AuthClient, query: &UserQuery) -> ApiResult<Paginated<User>> {
    client
        .send_json(ApiRequest::get(USERS).query_pairs(query.to_query()))
        .await
}

/// # Errors
/// Any API error.
pub async fn get(client: &AuthClient, id: u64) -> ApiResult<User> {
    client.send_json(ApiRequest::get(format!("{USERS}{id}/"))).await
}

/// # Errors
/// Any API error, including the backend's validation errors.
pub async fn create(client: &AuthClient, user: &NewUser) -> ApiResult<User> {
    client
        .send_json(ApiRequest::post(USERS).json(user)?)
        .await
}

/// Replaces profile fields of another account.
///
/// # Errors
/// Any API error, including the backend's validation errors.
pub async fn update(client: &AuthClient, id: u64, fields: &Value) -> ApiResult<User> {
    client
        .send_json(ApiRequest::put(format!("{USERS}{id}/")).json(fields)?)
        .await
}

/// # Errors
/// Any API error; an unknown id is a 404 status error.
pub async fn delete(client: &AuthClient, id: u64) -> ApiResult<()> {
    client
        .send_empty(ApiRequest::delete(format!("{USERS}{id}/")))
        .await
}

/// Activates or deactivates an account.
///
/// # Errors
/// Any API error.
pub async fn set_active(client: &AuthClient, id: u64, active: bool) -> ApiResult<User> {
    let request =
        ApiRequest::patch(format!("{USERS}{id}/status/")).json(&json!({ "is_active": active }))?;
    client.send_json(request).await
}

/// # Errors
/// Any API error; a wrong current password is a 400 from the backend.
pub async fn change_password(
    client: &AuthClient,
    id: u64,
    change: &PasswordChange,
) -> ApiResult<MessageResponse> {
    let request = ApiRequest::post(format!("{USERS}{id}/change-password/")).json(change)?;
    client.send_json(request).await
}
