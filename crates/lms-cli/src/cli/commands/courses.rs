//! Catalog command handlers.

use anyhow::{Context, Result, bail};
use lms_core::api;
use lms_core::http::AuthClient;
use lms_types::{Course, CourseDraft, CourseFilters};
use serde_json::json;

use super::Output;

const DEFAULT_PAGE_SIZE: u32 = 10;

pub async fn list(client: &AuthClient, out: Output, filters: &CourseFilters) -> Result<()> {
    let page = api::courses::list(client, filters)
        .await
        .context("list courses")?;

    out.emit(&page, |page| {
        if page.results.is_empty() {
            println!("No courses found.");
            return;
        }
        for course in &page.results {
            println!("{}", course_line(course));
        }
        let size = filters.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        println!(
            "Page {} of {} ({} courses)",
            filters.page.unwrap_or(1),
            page.total_pages(size),
            page.count
        );
    })
}

pub async fn show(client: &AuthClient, out: Output, course: &str) -> Result<()> {
    let course = match course.parse::<u64>() {
        Ok(id) => api::courses::get(client, id).await,
        Err(_) => api::courses::by_slug(client, course).await,
    }
    .context("load course")?;
    let modules = api::courses::modules(client, course.id)
        .await
        .context("load modules")?;

    let view = json!({ "course": course, "modules": modules });
    out.emit(&view, |_| {
        println!("{}", course.title);
        println!(
            "  level: {}  price: {}  rating: {:.1} ({} reviews)",
            course.level,
            course.price_label(),
            course.average_rating,
            course.total_reviews
        );
        if let Some(category) = course.category_name() {
            println!("  category: {category}");
        }
        if let Some(instructor) = course.instructor_name() {
            println!("  instructor: {instructor}");
        }
        if course.is_cpd_accredited {
            println!("  CPD accredited: {} points", course.cpd_points);
        }
        if !course.short_description.is_empty() {
            println!();
            println!("{}", course.short_description);
        }
        if !modules.is_empty() {
            println!();
            for module in &modules {
                println!("  {}. {} ({} min)", module.order, module.title, module.duration_minutes);
            }
        }
    })
}

pub async fn categories(client: &AuthClient, out: Output) -> Result<()> {
    let categories = api::courses::categories(client)
        .await
        .context("list categories")?;

    out.emit(&categories, |categories| {
        if categories.is_empty() {
            println!("No categories found.");
        }
        for category in categories {
            match category.course_count {
                Some(count) => println!("{:>4}  {}  ({count} courses)", category.id, category.name),
                None => println!("{:>4}  {}", category.id, category.name),
            }
        }
    })
}

pub async fn create(client: &AuthClient, out: Output, draft: &CourseDraft) -> Result<()> {
    let course = api::courses::create(client, draft)
        .await
        .context("create course")?;

    out.emit(&course, |course| {
        println!("Created course {} (id {})", course.title, course.id);
    })
}

pub async fn update(client: &AuthClient, out: Output, id: u64, draft: &CourseDraft) -> Result<()> {
    if draft.is_empty() {
        bail!("Nothing to update: pass at least one field flag");
    }
    let course = api::courses::update(client, id, draft)
        .await
        .with_context(|| format!("update course {id}"))?;

    out.emit(&course, |course| {
        println!("Updated {}", course_line(course));
    })
}

pub async fn delete(client: &AuthClient, id: u64) -> Result<()> {
    api::courses::delete(client, id)
        .await
        .with_context(|| format!("delete course {id}"))?;
    println!("Deleted course {id}.");
    Ok(())
}

fn course_line(course: &Course) -> String {
    format!(
        "{:>4}  {}  [{}]  {}  {:.1}/5",
        course.id,
        course.title,
        course.level,
        course.price_label(),
        course.average_rating
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_line_shows_free_label() {
        let course: Course = serde_json::from_str(
            r#"{"id": 7, "title": "Intro", "level": "beginner", "is_free": true, "average_rating": 4}"#,
        )
        .unwrap();
        assert_eq!(course_line(&course), "   7  Intro  [beginner]  Free  4.0/5");
    }
}
