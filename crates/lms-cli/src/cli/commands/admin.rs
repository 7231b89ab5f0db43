//! Admin command handlers.

use anyhow::{Context, Result};
use lms_core::api;
use lms_core::http::AuthClient;
use lms_types::TimeRange;
use serde_json::json;

use super::Output;

pub async fn stats(client: &AuthClient, out: Output) -> Result<()> {
    let (dashboard, users) = tokio::try_join!(
        api::admin::dashboard_stats(client),
        api::admin::user_statistics(client),
    )
    .context("load admin statistics")?;

    let view = json!({ "dashboard": dashboard, "users": users });
    out.emit(&view, |_| {
        println!("Courses:      {}", dashboard.total_courses);
        println!("Enrollments:  {}", dashboard.total_enrollments);
        println!("Revenue:      {:.2}", dashboard.total_revenue);
        println!(
            "Users:        {} ({} active, {} admins, {} new today)",
            users.total_users, users.active_users, users.admin_users, users.new_users_today
        );
        for (department, count) in &users.users_by_department {
            println!("  {department}: {count}");
        }
        if !dashboard.recent_activities.is_empty() {
            println!("Recent activity:");
            for activity in &dashboard.recent_activities {
                println!("  {}  {}  {}", activity.timestamp, activity.user, activity.action);
            }
        }
    })
}

pub async fn metrics(client: &AuthClient, out: Output) -> Result<()> {
    let metrics = api::admin::system_metrics(client)
        .await
        .context("load system metrics")?;

    out.emit(&metrics, |m| {
        println!("Uptime:          {}", m.server_uptime);
        println!("Database size:   {}", m.database_size);
        println!("Cache hit rate:  {:.1}%", m.cache_hit_rate);
        println!("Active sessions: {}", m.active_sessions);
        println!("Error rate:      {:.2}%", m.error_rate);
    })
}

pub async fn activity(
    client: &AuthClient,
    out: Output,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<()> {
    let entries = api::admin::recent_activities(client, limit, offset)
        .await
        .context("load recent activity")?;

    out.emit(&entries, |entries| {
        if entries.is_empty() {
            println!("No recent activity.");
        }
        for entry in entries {
            println!(
                "{}  {}  {}  {}",
                entry.timestamp, entry.user.username, entry.action, entry.details
            );
        }
    })
}

pub async fn analytics(client: &AuthClient, out: Output, range: TimeRange) -> Result<()> {
    let (users, courses) = tokio::try_join!(
        api::admin::user_analytics(client, range),
        api::admin::course_analytics(client),
    )
    .context("load analytics")?;

    let view = json!({ "users": users, "courses": courses });
    out.emit(&view, |_| {
        println!("Sign-ups ({}), growth {:+.1}%:", range.as_str(), users.growth);
        for (label, count) in users.labels.iter().zip(&users.data) {
            println!("  {label}: {count}");
        }
        if !courses.popular_courses.is_empty() {
            println!("Popular courses:");
            for course in &courses.popular_courses {
                println!(
                    "  {:>4}  {}  {} enrollments  {:.1}/5",
                    course.id, course.title, course.enrollments, course.rating
                );
            }
        }
        if !courses.categories.is_empty() {
            println!("Categories:");
            for category in &courses.categories {
                println!("  {}: {}", category.name, category.count);
            }
        }
    })
}

pub async fn backup(client: &AuthClient, out: Output) -> Result<()> {
    let result = api::admin::backup(client).await.context("start backup")?;

    out.emit(&result, |result| {
        if !result.message.is_empty() {
            println!("{}", result.message);
        }
        println!("Backup: {}", result.backup_url);
    })
}

pub async fn clear_cache(client: &AuthClient, out: Output) -> Result<()> {
    let response = api::admin::clear_cache(client)
        .await
        .context("clear cache")?;

    out.emit(&response, |response| {
        if response.message.is_empty() {
            println!("Cache cleared.");
        } else {
            println!("{}", response.message);
        }
    })
}
