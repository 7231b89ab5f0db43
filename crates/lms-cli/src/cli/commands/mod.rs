//! CLI command handlers.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod certificates;
pub mod config;
pub mod courses;
pub mod enrollments;
pub mod users;

/// Output mode shared by the API-backed commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Prints `value` as pretty JSON when `--json` is set, otherwise runs the
    /// human-readable renderer.
    pub fn emit<T: Serialize>(self, value: &T, render: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value).context("serialize output")?;
            println!("{text}");
        } else {
            render(value);
        }
        Ok(())
    }
}

/// Trims a timestamp like `2024-05-01T10:00:00.123456Z` to its date.
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}
