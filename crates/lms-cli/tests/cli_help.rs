use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("lms")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("courses"))
        .stdout(predicate::str::contains("certificates"));
}

#[test]
fn test_courses_help_shows_subcommands() {
    cargo_bin_cmd!("lms")
        .args(["courses", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("categories"));
}

#[test]
fn test_courses_list_help_shows_filters() {
    cargo_bin_cmd!("lms")
        .args(["courses", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--min-rating"))
        .stdout(predicate::str::contains("--page-size"));
}

#[test]
fn test_invalid_level_is_rejected() {
    cargo_bin_cmd!("lms")
        .args(["courses", "list", "--level", "expert"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown level"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("lms")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_admin_users_help_shows_subcommands() {
    cargo_bin_cmd!("lms")
        .args(["admin", "users", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deactivate"))
        .stdout(predicate::str::contains("password"));
}

#[test]
fn test_course_update_without_fields_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .env("LMS_API_URL", "http://127.0.0.1:9/api/v1/")
        .args(["courses", "update", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}
