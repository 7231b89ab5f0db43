//! Integration tests for the REST wrappers: auth, catalog, admin and quizzes.

use std::sync::Arc;

use lms_core::api;
use lms_core::auth::{FileTokenStore, HttpRefreshExchange, NoopEffects, TokenStore};
use lms_core::http::{ApiErrorKind, AuthClient, ClientSettings};
use lms_types::{
    CourseDraft, CourseFilters, CourseLevel, LoginCredentials, NewUser, PasswordChange,
    QuizSubmission, TimeRange, UserQuery,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn client_from(server: &MockServer, store: &Arc<FileTokenStore>) -> AuthClient {
    let base = url::Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let exchange = Arc::new(HttpRefreshExchange::new(&base, None).unwrap());
    AuthClient::new(
        ClientSettings::new(base),
        Arc::clone(store) as Arc<dyn TokenStore>,
        exchange,
        Arc::new(NoopEffects),
    )
}

fn client(server: &MockServer, dir: &TempDir) -> (AuthClient, Arc<FileTokenStore>) {
    let store = Arc::new(FileTokenStore::open(dir.path().join("session.json")).unwrap());
    (client_from(server, &store), store)
}

/// Client with `A1`/`R1` already stored.
fn signed_in(server: &MockServer, dir: &TempDir) -> AuthClient {
    let store = Arc::new(FileTokenStore::open(dir.path().join("session.json")).unwrap());
    store.save_tokens("A1", Some("R1")).unwrap();
    client_from(server, &store)
}

fn credentials() -> LoginCredentials {
    LoginCredentials {
        username: "ada".into(),
        password: "secret".into(),
    }
}

fn auth_body(is_admin: bool) -> serde_json::Value {
    json!({
        "access": "A1",
        "refresh": "R1",
        "user": {"id": 3, "username": "ada", "is_admin": is_admin}
    })
}

#[tokio::test]
async fn test_login_persists_session_to_disk() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .and(body_json(json!({"username": "ada", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(false)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, store) = client(&server, &dir);
    let user = api::auth::login(&client, &credentials()).await.unwrap();

    assert_eq!(user.id, 3);
    assert_eq!(store.access_token().as_deref(), Some("A1"));
    assert!(client.session().has_refresh);

    let reopened = FileTokenStore::open(store.path()).unwrap();
    assert_eq!(reopened.refresh_token().as_deref(), Some("R1"));
    assert_eq!(reopened.user().map(|u| u.username), Some("ada".to_string()));
}

#[tokio::test]
async fn test_bad_credentials_surface_backend_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, store) = client(&server, &dir);
    let err = api::auth::login(&client, &credentials()).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert_eq!(err.message, "HTTP 401: No active account found");
    assert_eq!(store.access_token(), None);
}

#[tokio::test]
async fn test_admin_login_refuses_learner_account() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/admin/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(false)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, store) = client(&server, &dir);
    let err = api::auth::admin_login(&client, &credentials())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Forbidden);
    assert_eq!(err.message, "Access denied. Admin privileges required.");
    assert_eq!(store.access_token(), None);
}

#[tokio::test]
async fn test_logout_blacklists_refresh_token_and_clears_store() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout/"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, store) = client(&server, &dir);
    api::auth::login(&client, &credentials()).await.unwrap();
    api::auth::logout(&client).await.unwrap();

    assert_eq!(store.refresh_token(), None);
    assert!(!store.path().exists());
    assert!(!client.session().has_access);
}

#[tokio::test]
async fn test_restore_session_without_tokens_is_none() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (client, _store) = client(&server, &dir);

    assert_eq!(api::auth::restore_session(&client).await.unwrap(), None);
}

#[tokio::test]
async fn test_course_filters_become_query_params() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/courses/"))
        .and(query_param("level", "advanced"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 11,
            "next": null,
            "previous": "http://x/?page=1",
            "results": [{"id": 9, "title": "Async Rust", "level": "advanced", "price": "0.00", "is_free": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, _store) = client(&server, &dir);
    let filters = CourseFilters {
        level: Some(CourseLevel::Advanced),
        page: Some(2),
        ..CourseFilters::default()
    };
    let page = api::courses::list(&client, &filters).await.unwrap();

    assert_eq!(page.count, 11);
    assert_eq!(page.results[0].title, "Async Rust");
    assert_eq!(page.results[0].price_label(), "Free");
}

#[tokio::test]
async fn test_admin_user_management_round() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/"))
        .and(header("Authorization", "Bearer A1"))
        .and(query_param("search", "grace"))
        .and(query_param("is_admin", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"id": 5, "username": "grace", "is_admin": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/"))
        .and(body_json(json!({
            "username": "linus",
            "email": "linus@example.com",
            "password": "hunter22",
            "is_admin": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 6, "username": "linus"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/users/6/"))
        .and(body_json(json!({"department": "Research"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 6, "username": "linus", "department": "Research"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/6/status/"))
        .and(body_json(json!({"is_active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 6, "username": "linus", "is_active": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/6/change-password/"))
        .and(body_json(json!({"current_password": "hunter22", "new_password": "hunter23"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Password changed"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/6/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = signed_in(&server, &dir);

    let query = UserQuery {
        search: Some("grace".into()),
        is_admin: Some(true),
        ..UserQuery::default()
    };
    let page = api::users::list(&client, &query).await.unwrap();
    assert_eq!(page.results[0].username, "grace");

    let new_user = NewUser {
        username: "linus".into(),
        email: "linus@example.com".into(),
        password: "hunter22".into(),
        first_name: String::new(),
        last_name: String::new(),
        department: None,
        is_admin: false,
    };
    let created = api::users::create(&client, &new_user).await.unwrap();
    assert_eq!(created.id, 6);

    let updated = api::users::update(&client, 6, &json!({"department": "Research"}))
        .await
        .unwrap();
    assert_eq!(updated.department.as_deref(), Some("Research"));

    let deactivated = api::users::set_active(&client, 6, false).await.unwrap();
    assert_eq!(deactivated.is_active, Some(false));

    let change = PasswordChange {
        current_password: "hunter22".into(),
        new_password: "hunter23".into(),
    };
    let message = api::users::change_password(&client, 6, &change)
        .await
        .unwrap();
    assert_eq!(message.message, "Password changed");

    api::users::delete(&client, 6).await.unwrap();
}

#[tokio::test]
async fn test_deleting_unknown_user_is_not_found() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = signed_in(&server, &dir);
    let err = api::users::delete(&client, 99).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::HttpStatus);
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "HTTP 404: Not found.");
}

#[tokio::test]
async fn test_course_create_update_delete() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/courses/courses/"))
        .and(body_json(json!({"title": "Rust 201", "level": "intermediate", "price": "49.00"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12, "title": "Rust 201", "level": "intermediate", "price": "49.00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/courses/courses/12/"))
        .and(body_json(json!({"status": "published"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12, "title": "Rust 201", "level": "intermediate", "status": "published"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/courses/courses/12/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = signed_in(&server, &dir);

    let draft = CourseDraft {
        title: Some("Rust 201".into()),
        level: Some(CourseLevel::Intermediate),
        price: Some("49.00".into()),
        ..CourseDraft::default()
    };
    let course = api::courses::create(&client, &draft).await.unwrap();
    assert_eq!(course.id, 12);

    let publish = CourseDraft {
        status: Some(lms_types::CourseStatus::Published),
        ..CourseDraft::default()
    };
    let course = api::courses::update(&client, 12, &publish).await.unwrap();
    assert_eq!(course.status, Some(lms_types::CourseStatus::Published));

    api::courses::delete(&client, 12).await.unwrap();
}

#[tokio::test]
async fn test_admin_maintenance_and_analytics() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/system-metrics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_uptime": "3 days",
            "database_size": "120 MB",
            "cache_hit_rate": 93.5,
            "active_sessions": 14,
            "error_rate": 0.2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/recent-activities/"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "user": {"id": 3, "username": "ada", "email": "ada@example.com"},
            "action": "login",
            "details": "",
            "timestamp": "2024-05-01T10:00:00Z",
            "ip_address": "10.0.0.1"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/user-analytics/"))
        .and(query_param("time_range", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "labels": ["W1", "W2"], "data": [4, 7], "growth": 75.0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/backup/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "backup_url": "/backups/db.sql", "message": "Backup created"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/clear-cache/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Cache cleared"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = signed_in(&server, &dir);

    let metrics = api::admin::system_metrics(&client).await.unwrap();
    assert_eq!(metrics.active_sessions, 14);

    let activity = api::admin::recent_activities(&client, Some(2), None)
        .await
        .unwrap();
    assert_eq!(activity[0].user.username, "ada");

    let analytics = api::admin::user_analytics(&client, TimeRange::Month)
        .await
        .unwrap();
    assert_eq!(analytics.data, vec![4, 7]);

    let backup = api::admin::backup(&client).await.unwrap();
    assert_eq!(backup.backup_url, "/backups/db.sql");

    let cleared = api::admin::clear_cache(&client).await.unwrap();
    assert_eq!(cleared.message, "Cache cleared");
}

#[tokio::test]
async fn test_quiz_attempt_submit_and_list() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/enrollments/quiz-attempts/"))
        .and(body_json(json!({"enrollment": 4, "quiz": 8, "score": 80.0, "time_taken": 300})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1, "enrollment": 4, "score": 80.0, "passed": true, "attempt_number": 1,
            "started_at": "2024-05-01T10:00:00Z", "time_taken": 300
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollments/quiz-attempts/"))
        .and(query_param("quiz", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 1, "enrollment": 4, "score": 80.0, "passed": true, "attempt_number": 1,
                "quiz": {"id": 8, "title": "Ownership", "passing_score": 70, "max_attempts": 3}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = signed_in(&server, &dir);

    let submission = QuizSubmission {
        enrollment: 4,
        quiz: 8,
        score: 80.0,
        time_taken: 300,
    };
    let attempt = api::enrollments::submit_quiz_attempt(&client, &submission)
        .await
        .unwrap();
    assert!(attempt.passed);

    let attempts = api::enrollments::quiz_attempts(&client, 8).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(
        attempts[0].quiz.as_ref().and_then(|q| q.full()).map(|q| q.title.as_str()),
        Some("Ownership")
    );
}
