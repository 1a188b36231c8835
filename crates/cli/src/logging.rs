// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: `chat` mode logs to stderr since a human is watching;
//! `master`/`slave`/`worker` are long-running and log to a non-blocking
//! file appender instead.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("log path has no file name: {0:?}")]
    NoFileName(PathBuf),
}

/// Guard that must be held for the process lifetime to keep a
/// non-blocking file appender flushing; `None` when logging to stderr.
pub enum LogGuard {
    File(WorkerGuard),
    Stderr,
}

fn env_filter(log_level: Option<&str>) -> EnvFilter {
    if let Some(level) = log_level {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialise the global `tracing` subscriber. `log_file` is ignored (and
/// may be `None`) when `to_stderr` is true.
pub fn init(to_stderr: bool, log_level: Option<&str>, log_file: Option<&Path>) -> Result<LogGuard, LoggingError> {
    let filter = env_filter(log_level);

    if to_stderr {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
        return Ok(LogGuard::Stderr);
    }

    let path = match log_file {
        Some(p) => p.to_path_buf(),
        None => default_log_path()?,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(LoggingError::CreateDir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::NoFileName(path.clone()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .try_init();

    Ok(LogGuard::File(guard))
}

fn default_log_path() -> Result<PathBuf, LoggingError> {
    Ok(crate::config::config_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("mesh.log"))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
