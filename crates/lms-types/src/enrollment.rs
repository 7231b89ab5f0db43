use serde::{Deserialize, Serialize};

use crate::course::{Course, Lesson};
use crate::page::Ref;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Ref<Course>>,
    #[serde(default)]
    pub enrolled_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<String>,
}

impl Enrollment {
    pub fn course_title(&self) -> String {
        match &self.course {
            Some(Ref::Full(course)) => course.title.clone(),
            Some(Ref::Id(id)) => format!("course #{id}"),
            None => "unknown course".to_string(),
        }
    }

    /// Progress clamped to 0..=100 for display.
    pub fn progress(&self) -> f64 {
        self.progress_percentage.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: u64,
    pub enrollment: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<Ref<Lesson>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Seconds spent on the lesson.
    #[serde(default)]
    pub time_spent: u64,
}

/// Quiz as nested in an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub passing_score: u32,
    #[serde(default)]
    pub max_attempts: u32,
    /// Minutes; `None` means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: u64,
    pub enrollment: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Ref<QuizSummary>>,
    pub score: f64,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub attempt_number: u32,
    #[serde(default)]
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub time_taken: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub enrollment: u64,
    pub quiz: u64,
    pub score: f64,
    /// Seconds.
    pub time_taken: u64,
}
