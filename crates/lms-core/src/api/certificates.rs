//! Completion certificates.

use lms_types::{
    Certificate, CertificateDownload, CertificateStats, CertificateVerification, Listing,
};
use serde_json::json;

use crate::http::{ApiRequest, ApiResult, AuthClient};

const CERTIFICATES: &str = "certificates/";

/// # Errors
/// Any API error.
pub async fn list(client: &AuthClient) -> ApiResult<Vec<Certificate>> {
    let listing: Listing<Certificate> = client.send_json(ApiRequest::get(CERTIFICATES)).await?;
    Ok(listing.into_items())
}

/// # Errors
/// Any API error.
pub async fn get(client: &AuthClient, id: u64) -> ApiResult<Certificate> {
    client
        .send_json(ApiRequest::get(format!("{CERTIFICATES}{id}/")))
        .await
}

/// Issues a certificate for a completed enrollment.
///
/// # Errors
/// Any API error; the backend answers 400 for unfinished enrollments.
pub async fn generate(client: &AuthClient, enrollment_id: u64) -> ApiResult<Certificate> {
    let request = ApiRequest::post(format!("{CERTIFICATES}generate/"))
        .json(&json!({ "enrollment_id": enrollment_id }))?;
    client.send_json(request).await
}

/// # Errors
/// Any API error.
pub async fn download(client: &AuthClient, id: u64) -> ApiResult<CertificateDownload> {
    client
        .send_json(ApiRequest::get(format!("{CERTIFICATES}{id}/download/")))
        .await
}

/// # Errors
/// Any API error.
pub async fn verify(client: &AuthClient, id: u64) -> ApiResult<CertificateVerification> {
    client
        .send_json(ApiRequest::get(format!("{CERTIFICATES}{id}/verify/")))
        .await
}

/// # Errors
/// Any API error.
pub async fn search(client: &AuthClient, query: &str) -> ApiResult<Vec<Certificate>> {
    let listing: Listing<Certificate> = client
        .send_json(ApiRequest::get(CERTIFICATES).query("search", query))
        .await?;
    Ok(listing.into_items())
}

/// # Errors
/// Any API error.
pub async fn stats(client: &AuthClient) -> ApiResult<CertificateStats> {
    client
        .send_json(ApiRequest::get(format!("{CERTIFICATES}stats/")))
        .await
}
