// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart sentinel: a single atomically-written file recording that a
//! restart was requested, consumed by the next process to start.

use crate::atomic::{write_json_atomic, FileMode, StorageError};
use mesh_core::{ErrorKind, RestartKind, RestartSentinelRecord};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("failed to persist restart sentinel: {0}")]
    Write(#[from] StorageError),
}

impl RestartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RestartError::Write(_) => ErrorKind::IoError,
        }
    }
}

/// Tracks whether a restart has been requested from this process (an
/// in-memory flag, not re-derived from the sentinel file) and persists
/// the request so the next process to start can act on it.
pub struct RestartManager {
    sentinel_path: PathBuf,
    requested: AtomicBool,
}

impl RestartManager {
    pub fn new(sentinel_path: impl Into<PathBuf>) -> Self {
        Self {
            sentinel_path: sentinel_path.into(),
            requested: AtomicBool::new(false),
        }
    }

    pub fn sentinel_path(&self) -> &Path {
        &self.sentinel_path
    }

    /// Write the sentinel atomically and record, for this process, that a
    /// restart has been requested.
    pub fn request_restart(
        &self,
        kind: RestartKind,
        now_ms: u64,
        pid: u32,
        note: impl Into<String>,
    ) -> Result<(), RestartError> {
        let record = RestartSentinelRecord::new(kind, now_ms, pid, note);
        write_json_atomic(&self.sentinel_path, &record, FileMode::Private)?;
        self.requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Whether this process has requested a restart of itself.
    pub fn is_restart_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Read and delete the sentinel if present. A malformed sentinel is
    /// deleted silently rather than surfaced as an error; absent either
    /// way, a second call with no writer in between returns `None`.
    pub fn consume_sentinel(&self) -> Option<RestartSentinelRecord> {
        let bytes = std::fs::read(&self.sentinel_path).ok()?;
        let record = serde_json::from_slice(&bytes).ok();
        let _ = std::fs::remove_file(&self.sentinel_path);
        record
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
