use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: u64,
    pub user: String,
    pub action: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_courses: u64,
    pub total_enrollments: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub recent_activities: Vec<RecentActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub new_users_today: u64,
    #[serde(default)]
    pub admin_users: u64,
    #[serde(default)]
    pub users_by_department: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateStats {
    pub total_certificates: u64,
    #[serde(default)]
    pub recent_certificates: u64,
    #[serde(default)]
    pub certificates_by_month: Vec<MonthlyCount>,
}

/// `users/` list query. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub search: Option<String>,
    pub is_admin: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl UserQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        if let Some(is_admin) = self.is_admin {
            query.push(("is_admin".to_string(), is_admin.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_string(), page_size.to_string()));
        }
        query
    }
}

/// Account created by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    #[serde(default)]
    pub server_uptime: String,
    #[serde(default)]
    pub database_size: String,
    #[serde(default)]
    pub cache_hit_rate: f64,
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityActor {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// One audit log row from `admin/recent-activities/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: u64,
    pub user: ActivityActor,
    pub action: String,
    #[serde(default)]
    pub details: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Window for `admin/user-analytics/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    #[default]
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(TimeRange::Today),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(format!(
                "unknown time range '{other}' (expected today, week, month or year)"
            )),
        }
    }
}

/// Sign-up series: `labels[i]` pairs with `data[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnalytics {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<u64>,
    #[serde(default)]
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularCourse {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub enrollments: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    #[serde(default)]
    pub popular_courses: Vec<PopularCourse>,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupResult {
    pub backup_url: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_query_sends_only_set_fields() {
        let query = UserQuery {
            search: Some(" ".into()),
            is_admin: Some(false),
            page: Some(3),
            ..UserQuery::default()
        };
        assert_eq!(
            query.to_query(),
            vec![
                ("is_admin".to_string(), "false".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_range_parses_and_defaults_to_week() {
        assert_eq!("Month".parse::<TimeRange>(), Ok(TimeRange::Month));
        assert!("decade".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default().as_str(), "week");
    }
}
