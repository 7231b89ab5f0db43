use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::User;
use crate::page::Ref;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(format!(
                "unknown level '{other}' (expected beginner, intermediate or advanced)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(format!(
                "unknown status '{other}' (expected draft, published or archived)"
            )),
        }
    }
}

/// `price` catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceFilter {
    Free,
    Paid,
}

impl PriceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceFilter::Free => "free",
            PriceFilter::Paid => "paid",
        }
    }
}

impl FromStr for PriceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PriceFilter::Free),
            "paid" => Ok(PriceFilter::Paid),
            other => Err(format!("unknown price filter '{other}' (expected free or paid)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCategory {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_count: Option<u64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<Ref<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Ref<CourseCategory>>,
    pub level: CourseLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration_hours: f64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub is_cpd_accredited: bool,
    #[serde(default)]
    pub cpd_points: u32,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<String>,
    #[serde(default)]
    pub total_enrollments: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Course {
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(Ref::full)
            .map(|c| c.name.as_str())
    }

    pub fn instructor_name(&self) -> Option<String> {
        self.instructor
            .as_ref()
            .and_then(Ref::full)
            .map(User::display_name)
    }

    /// Price label for listings: "Free", the discount when present, else the list price.
    pub fn price_label(&self) -> String {
        if self.is_free {
            return "Free".to_string();
        }
        match self.discount_price.as_deref() {
            Some(discount) if !discount.is_empty() => format!("{discount} (was {})", self.price),
            _ => self.price.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: u64,
    pub course: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Video,
    Article,
    Quiz,
    Assignment,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u64,
    pub module: u64,
    pub title: String,
    pub lesson_type: LessonType,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_preview: bool,
    #[serde(default)]
    pub must_complete: bool,
}

/// Body for course create and update. Unset fields are left out, so an update
/// only touches what is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// Category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
    /// Decimal string, e.g. `"49.00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cpd_accredited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpd_points: Option<u32>,
}

impl CourseDraft {
    pub fn is_empty(&self) -> bool {
        *self == CourseDraft::default()
    }
}

/// Catalog query parameters. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilters {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub price: Option<PriceFilter>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CourseFilters {
    /// Query string pairs in a stable order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                query.push((key.to_string(), value));
            }
        };
        push("category", self.category.clone());
        push("level", self.level.map(|l| l.as_str().to_string()));
        push("price", self.price.map(|p| p.as_str().to_string()));
        push("min_rating", self.min_rating.map(|r| r.to_string()));
        push("search", self.search.clone());
        push("ordering", self.ordering.clone());
        push("page", self.page.map(|p| p.to_string()));
        push("page_size", self.page_size.map(|p| p.to_string()));
        query
    }
}

/// Accepts a JSON number or a numeric string (decimal fields arrive as strings).
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
        Null(()),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
        NumOrString::Null(()) => Ok(0.0),
    }
}
