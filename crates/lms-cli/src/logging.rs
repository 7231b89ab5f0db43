//! File logging for the `lms` binary.
//!
//! Stdout and stderr belong to command output, so tracing events go to a
//! daily-rotated file under `logs_dir()`.

use std::path::Path;

use lms_core::config::{Config, paths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Filter directives override, e.g. `LMS_LOG=lms_core=debug`.
pub const LOG_ENV: &str = "LMS_LOG";

/// Installs the global subscriber. The returned guard flushes the writer on
/// drop and must live until the process exits.
///
/// Logging is best-effort: if the log directory cannot be created the CLI
/// runs without it.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    init_in(&paths::logs_dir(), config)
}

fn init_in(dir: &Path, config: &Config) -> Option<WorkerGuard> {
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("lms")
        .filename_suffix("log")
        .build(dir)
    {
        Ok(appender) => appender,
        Err(err) => {
            eprintln!("Warning: logging disabled ({}): {err}", dir.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
    {
        eprintln!("Warning: logging disabled: {err}");
        return None;
    }

    Some(guard)
}
