//! Enrollment command handlers.

use anyhow::{Context, Result};
use lms_core::api;
use lms_core::http::AuthClient;

use super::{Output, date_part};

pub async fn list(client: &AuthClient, out: Output) -> Result<()> {
    let enrollments = api::enrollments::list(client)
        .await
        .context("list enrollments")?;

    out.emit(&enrollments, |enrollments| {
        if enrollments.is_empty() {
            println!("No enrollments yet. Try `lms courses list`.");
        }
        for enrollment in enrollments {
            let status = if enrollment.is_completed {
                "completed"
            } else {
                "in progress"
            };
            println!(
                "{:>4}  {}  {:.0}%  {status}  (since {})",
                enrollment.id,
                enrollment.course_title(),
                enrollment.progress(),
                date_part(&enrollment.enrolled_at)
            );
        }
    })
}

pub async fn enroll(client: &AuthClient, out: Output, course: u64) -> Result<()> {
    let enrollment = api::enrollments::enroll(client, course)
        .await
        .with_context(|| format!("enroll in course {course}"))?;

    out.emit(&enrollment, |enrollment| {
        println!(
            "Enrolled in {} (enrollment {})",
            enrollment.course_title(),
            enrollment.id
        );
    })
}

pub async fn complete(client: &AuthClient, out: Output, enrollment: u64, lesson: u64) -> Result<()> {
    let progress = api::enrollments::complete_lesson(client, enrollment, lesson)
        .await
        .with_context(|| format!("complete lesson {lesson}"))?;

    out.emit(&progress, |_| {
        println!("Lesson {lesson} marked complete.");
    })
}

pub async fn quiz_attempts(client: &AuthClient, out: Output, quiz: u64) -> Result<()> {
    let attempts = api::enrollments::quiz_attempts(client, quiz)
        .await
        .with_context(|| format!("list attempts for quiz {quiz}"))?;

    out.emit(&attempts, |attempts| {
        if attempts.is_empty() {
            println!("No attempts at quiz {quiz}.");
        }
        for attempt in attempts {
            let verdict = if attempt.passed { "passed" } else { "failed" };
            println!(
                "#{}  {:.0}%  {verdict}  {}s  ({})",
                attempt.attempt_number,
                attempt.score,
                attempt.time_taken,
                date_part(&attempt.started_at)
            );
        }
    })
}
