//! Admin dashboard and maintenance endpoints.

use lms_types::{
    ActivityLogEntry, BackupResult, CourseAnalytics, DashboardStats, Listing, MessageResponse,
    SystemMetrics, TimeRange, UserAnalytics, UserStatistics,
};

use crate::http::{ApiRequest, ApiResult, AuthClient};

/// Platform-wide counters for the admin dashboard.
///
/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn dashboard_stats(client: &AuthClient) -> ApiResult<DashboardStats> {
    client
        .send_json(ApiRequest::get("admin/dashboard-stats/"))
        .await
}

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn user_statistics(client: &AuthClient) -> ApiResult<UserStatistics> {
    client.send_json(ApiRequest::get("users/statistics/")).await
}

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn system_metrics(client: &AuthClient) -> ApiResult<SystemMetrics> {
    client
        .send_json(ApiRequest::get("admin/system-metrics/"))
        .await
}

/// Audit log, newest first.
///
/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn recent_activities(
    client: &AuthClient,
    limit: Option<u32>,
    offset: Option<u32>,
) -> ApiResult<Vec<ActivityLogEntry>> {
    let mut request = ApiRequest::get("admin/recent-activities/");
    if let Some(limit) = limit {
        request = request.query("limit", limit);
    }
    if let Some(offset) = offset {
        request = request.query("offset", offset);
    }
    let listing: Listing<ActivityLogEntry> = client.send_json(request).await?;
    Ok(listing.into_items())
}

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn user_analytics(client: &AuthClient, range: TimeRange) -> ApiResult<UserAnalytics> {
    client
        .send_json(ApiRequest::get("admin/user-analytics/").query("time_range", range.as_str()))
        .await
}

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn course_analytics(client: &AuthClient) -> ApiResult<CourseAnalytics> {
    client
        .send_json(ApiRequest::get("admin/course-analytics/"))
        .await
}

/// Starts a database backup.
///
/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn backup(client: &AuthClient) -> ApiResult<BackupResult> {
    client.send_json(ApiRequest::post("admin/backup/")).await
}

/// # Errors
/// Any API error; non-admin sessions get a forbidden error.
pub async fn clear_cache(client: &AuthClient) -> ApiResult<MessageResponse> {
    client.send_json(ApiRequest::post("admin/clear-cache/")).await
}
