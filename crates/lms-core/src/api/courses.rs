//! Course catalog.

use lms_types::{
    Course, CourseCategory, CourseDraft, CourseFilters, Lesson, Listing, Module, Paginated,
};

use crate::http::{ApiError, ApiErrorKind, ApiRequest, ApiResult, AuthClient};

const COURSES: &str = "courses/courses/";

/// # Errors
/// Any API error.
pub async fn list(client: &AuthClient, filters: &CourseFilters) -> ApiResult<Paginated<Course>> {
    client
        .send_json(ApiRequest::get(COURSES).query_pairs(filters.to_query()))
        .await
}

/// # Errors
/// Any API error; a missing course is a 404 status error.
pub async fn get(client: &AuthClient, id: u64) -> ApiResult<Course> {
    client
        .send_json(ApiRequest::get(format!("{COURSES}{id}/")))
        .await
}

/// Looks a course up by its slug.
///
/// # Errors
/// A 404-style status error when no course has that slug.
pub async fn by_slug(client: &AuthClient, slug: &str) -> ApiResult<Course> {
    let page: Paginated<Course> = client
        .send_json(ApiRequest::get(COURSES).query("slug", slug))
        .await?;
    page.results.into_iter().next().ok_or_else(|| {
        let mut err =
            ApiError::new(ApiErrorKind::HttpStatus, format!("Course '{slug}' not found"));
        err.status = Some(404);
        err
    })
}

/// Creates a course (admin and instructor accounts).
///
/// # Errors
/// Any API error, including the backend's validation errors.
pub async fn create(client: &AuthClient, draft: &CourseDraft) -> ApiResult<Course> {
    client
        .send_json(ApiRequest::post(COURSES).json(draft)?)
        .await
}

/// Sends only the fields set on `draft`.
///
/// # Errors
/// Any API error, including the backend's validation errors.
pub async fn update(client: &AuthClient, id: u64, draft: &CourseDraft) -> ApiResult<Course> {
    client
        .send_json(ApiRequest::patch(format!("{COURSES}{id}/")).json(draft)?)
        .await
}

/// # Errors
/// Any API error; an unknown id is a 404 status error.
pub async fn delete(client: &AuthClient, id: u64) -> ApiResult<()> {
    client
        .send_empty(ApiRequest::delete(format!("{COURSES}{id}/")))
        .await
}

/// # Errors
/// Any API error.
pub async fn featured(client: &AuthClient) -> ApiResult<Vec<Course>> {
    listing(client, "courses/featured/").await
}

/// # Errors
/// Any API error.
pub async fn popular(client: &AuthClient) -> ApiResult<Vec<Course>> {
    listing(client, "courses/popular/").await
}

/// Recommendations for the signed-in learner.
///
/// # Errors
/// Any API error.
pub async fn recommended(client: &AuthClient) -> ApiResult<Vec<Course>> {
    listing(client, "courses/recommended/").await
}

/// Full-text search over titles and descriptions.
///
/// # Errors
/// Any API error.
pub async fn search(client: &AuthClient, query: &str) -> ApiResult<Vec<Course>> {
    let listing: Listing<Course> = client
        .send_json(ApiRequest::get("courses/search/").query("search", query))
        .await?;
    Ok(listing.into_items())
}

/// # Errors
/// Any API error.
pub async fn categories(client: &AuthClient) -> ApiResult<Vec<CourseCategory>> {
    let listing: Listing<CourseCategory> = client
        .send_json(ApiRequest::get("courses/categories/"))
        .await?;
    Ok(listing.into_items())
}

/// # Errors
/// Any API error.
pub async fn modules(client: &AuthClient, course_id: u64) -> ApiResult<Vec<Module>> {
    let listing: Listing<Module> = client
        .send_json(ApiRequest::get("courses/modules/").query("course", course_id))
        .await?;
    let mut modules = listing.into_items();
    modules.sort_by_key(|m| m.order);
    Ok(modules)
}

/// # Errors
/// Any API error.
pub async fn lessons(client: &AuthClient, module_id: u64) -> ApiResult<Vec<Lesson>> {
    let listing: Listing<Lesson> = client
        .send_json(ApiRequest::get("courses/lessons/").query("module", module_id))
        .await?;
    let mut lessons = listing.into_items();
    lessons.sort_by_key(|l| l.order);
    Ok(lessons)
}

async fn listing(client: &AuthClient, path: &str) -> ApiResult<Vec<Course>> {
    let listing: Listing<Course> = client.send_json(ApiRequest::get(path)).await?;
    Ok(listing.into_items())
}
