// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-to-temp-then-rename for JSON records: `run.json`, `spec.json`,
//! `state.json`, `result.json`, and the restart sentinel all go through
//! this so a reader never observes a partially-written file.

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Unix file mode to apply to a freshly written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// `0644`, world-readable. The default for run/agent records.
    Shared,
    /// `0600`, owner-only. Used for the gateway secret and restart sentinel.
    Private,
}

impl FileMode {
    #[cfg(unix)]
    fn bits(self) -> u32 {
        match self {
            FileMode::Shared => 0o644,
            FileMode::Private => 0o600,
        }
    }
}

/// Serialise `value` as JSON and atomically replace the file at `path`.
///
/// Writes to a sibling temp file in the same directory (so the rename is
/// same-filesystem and therefore atomic), fsyncs it, then renames over the
/// destination and fsyncs the parent directory.
pub fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
    mode: FileMode,
) -> Result<(), StorageError> {
    let path_str = path.display().to_string();
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| json_err(&path_str, e))?;
    write_bytes_atomic(path, &bytes, mode)
}

/// Atomically replace the file at `path` with `bytes`, via the same
/// temp-write-fsync-rename sequence as [`write_json_atomic`]. Used for
/// payloads that aren't JSON records, such as a committed file-transfer
/// chunk set.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8], mode: FileMode) -> Result<(), StorageError> {
    let path_str = path.display().to_string();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| io_err(&path_str, e))?;

    let tmp_name = format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("record"),
        std::process::id()
    );
    let tmp_path = dir.join(tmp_name);

    {
        let mut f = std::fs::File::create(&tmp_path).map_err(|e| io_err(&path_str, e))?;
        f.write_all(bytes).map_err(|e| io_err(&path_str, e))?;
        f.sync_all().map_err(|e| io_err(&path_str, e))?;
    }

    set_mode(&tmp_path, mode).map_err(|e| io_err(&path_str, e))?;

    std::fs::rename(&tmp_path, path).map_err(|e| io_err(&path_str, e))?;
    sync_dir(dir).map_err(|e| io_err(&path_str, e))?;

    Ok(())
}

/// Read and deserialise a JSON record previously written by
/// [`write_json_atomic`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let path_str = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| io_err(&path_str, e))?;
    serde_json::from_slice(&bytes).map_err(|e| json_err(&path_str, e))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: FileMode) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(mode.bits());
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: FileMode) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn io_err(path: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_string(),
        source,
    }
}

fn json_err(path: &str, source: serde_json::Error) -> StorageError {
    StorageError::Json {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
