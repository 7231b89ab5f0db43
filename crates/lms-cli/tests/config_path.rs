use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("api_url ="));
    assert!(contents.contains("# Overall timeout"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_url_keeps_other_settings() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "request_timeout_secs = 5\n").unwrap();

    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .env_remove("LMS_API_URL")
        .args(["config", "set-url", "https://lms.example.com/api/v1/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://lms.example.com/api/v1/"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains(r#"api_url = "https://lms.example.com/api/v1/""#));
    assert!(contents.contains("request_timeout_secs = 5"));
}

#[test]
fn test_set_url_rejects_invalid_url() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lms")
        .env("LMS_HOME", dir.path())
        .args(["config", "set-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API base URL"));
}
