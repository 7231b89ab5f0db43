//! Enrollments and lesson progress for the signed-in learner.

use lms_types::{Enrollment, LessonProgress, Listing, QuizAttempt, QuizSubmission};
use serde_json::json;

use crate::http::{ApiRequest, ApiResult, AuthClient};

const ENROLLMENTS: &str = "enrollments/enrollments/";
const LESSON_PROGRESS: &str = "enrollments/lesson-progress/";
const QUIZ_ATTEMPTS: &str = "enrollments/quiz-attempts/";

/// # Errors
/// Any API error.
pub async fn list(client: &AuthClient) -> ApiResult<Vec<Enrollment>> {
    let listing: Listing<Enrollment> = client.send_json(ApiRequest::get(ENROLLMENTS)).await?;
    Ok(listing.into_items())
}

/// Enrolls the current user in a course.
///
/// # Errors
/// Any API error; enrolling twice is a 400 from the backend.
pub async fn enroll(client: &AuthClient, course_id: u64) -> ApiResult<Enrollment> {
    client
        .send_json(ApiRequest::post(ENROLLMENTS).json(&json!({ "course": course_id }))?)
        .await
}

/// The current user's enrollment in `course_id`, if any.
///
/// # Errors
/// Any API error.
pub async fn for_course(client: &AuthClient, course_id: u64) -> ApiResult<Option<Enrollment>> {
    let listing: Listing<Enrollment> = client
        .send_json(ApiRequest::get(ENROLLMENTS).query("course", course_id))
        .await?;
    Ok(listing.into_items().into_iter().next())
}

/// # Errors
/// Any API error.
pub async fn update_progress(
    client: &AuthClient,
    enrollment_id: u64,
    progress_percentage: f64,
) -> ApiResult<Enrollment> {
    let request = ApiRequest::patch(format!("{ENROLLMENTS}{enrollment_id}/"))
        .json(&json!({ "progress_percentage": progress_percentage.clamp(0.0, 100.0) }))?;
    client.send_json(request).await
}

/// # Errors
/// Any API error.
pub async fn lesson_progress(
    client: &AuthClient,
    enrollment_id: u64,
    lesson_id: Option<u64>,
) -> ApiResult<Vec<LessonProgress>> {
    let mut request = ApiRequest::get(LESSON_PROGRESS).query("enrollment", enrollment_id);
    if let Some(lesson_id) = lesson_id {
        request = request.query("lesson", lesson_id);
    }
    let listing: Listing<LessonProgress> = client.send_json(request).await?;
    Ok(listing.into_items())
}

/// Marks a lesson completed.
///
/// # Errors
/// Any API error.
pub async fn complete_lesson(
    client: &AuthClient,
    enrollment_id: u64,
    lesson_id: u64,
) -> ApiResult<LessonProgress> {
    let request = ApiRequest::post(LESSON_PROGRESS).json(&json!({
        "enrollment": enrollment_id,
        "lesson": lesson_id,
        "completed": true,
    }))?;
    client.send_json(request).await
}

/// Records a finished quiz attempt.
///
/// # Errors
/// Any API error.
pub async fn submit_quiz_attempt(
    client: &AuthClient,
    submission: &QuizSubmission,
) -> ApiResult<QuizAttempt> {
    client
        .send_json(ApiRequest::post(QUIZ_ATTEMPTS).json(submission)?)
        .await
}

/// The current user's attempts at `quiz_id`, newest first.
///
/// # Errors
/// Any API error.
pub async fn quiz_attempts(client: &AuthClient, quiz_id: u64) -> ApiResult<Vec<QuizAttempt>> {
    let listing: Listing<QuizAttempt> = client
        .send_json(ApiRequest::get(QUIZ_ATTEMPTS).query("quiz", quiz_id))
        .await?;
    Ok(listing.into_items())
}
