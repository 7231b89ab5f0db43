//! Configuration management for the LMS client.
//!
//! Loads configuration from ${LMS_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV: &str = "LMS_API_URL";

pub mod paths {
    //! Path resolution for LMS configuration and data directories.
    //!
    //! LMS_HOME resolution order:
    //! 1. LMS_HOME environment variable (if set)
    //! 2. ~/.config/lms (default)

    use std::path::PathBuf;

    /// Returns the LMS home directory.
    ///
    /// Checks LMS_HOME env var first, falls back to ~/.config/lms
    pub fn lms_home() -> PathBuf {
        if let Ok(home) = std::env::var("LMS_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("lms")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        lms_home().join("config.toml")
    }

    /// Returns the path to the persisted session (token store).
    pub fn session_path() -> PathBuf {
        lms_home().join("session.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        lms_home().join("logs")
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::{DocumentMut, Item};

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    for (key, value) in user_doc.as_table() {
        match value {
            Item::None => {}
            other => doc[key] = other.clone(),
        }
    }

    Ok(doc.to_string())
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API
    pub api_url: String,

    /// Overall timeout for one API request in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Timeout for the refresh exchange in seconds (0 disables)
    pub refresh_timeout_secs: u32,

    /// Attach an X-Request-ID header to outbound requests
    pub request_id: bool,

    /// Log filter used when LMS_LOG is unset
    pub log_level: String,
}

impl Config {
    pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/";
    const DEFAULT_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// The result always ends with `/` so relative paths join under it.
    ///
    /// # Errors
    /// Returns an error if the chosen value is not a valid URL.
    pub fn resolved_api_url(&self) -> Result<url::Url> {
        let from_env = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        let raw = from_env
            .as_deref()
            .or(Some(self.api_url.as_str()).filter(|v| !v.trim().is_empty()))
            .unwrap_or(Self::DEFAULT_API_URL)
            .trim();

        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        url::Url::parse(&normalized).with_context(|| format!("Invalid API base URL: {raw}"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.request_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.refresh_timeout_secs)
    }

    /// Saves only the api_url field to the default config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or written.
    pub fn save_api_url(api_url: &str) -> Result<()> {
        Self::save_api_url_to(&paths::config_path(), api_url)
    }

    /// Saves only the api_url field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_api_url_to(path: &Path, api_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        url::Url::parse(api_url.trim())
            .with_context(|| format!("Invalid API base URL: {api_url}"))?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["api_url"] = value(api_url.trim());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            refresh_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            request_id: true,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn secs_to_timeout(secs: u32) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(u64::from(secs)))
}
