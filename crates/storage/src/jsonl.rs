// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSON-lines logs: `events.jsonl` and `history.jsonl`.
//!
//! Each line is a complete, self-contained JSON value. Appends take an
//! exclusive advisory lock on the file for the duration of the write so
//! concurrent writers (a worker process and a coordinator-side compaction
//! pass, say) never interleave partial lines. A single line larger than
//! [`MAX_LINE_BYTES`] is rejected rather than silently truncated.

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::io::{BufRead, Read, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;

/// Maximum size of a single encoded line, including its trailing newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum JsonlError {
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
    #[error("line exceeds {limit} bytes at {path}")]
    LineTooLarge { path: String, limit: usize },
    #[error("non-utf8 line at {path}:{line_no}")]
    NotUtf8 { path: String, line_no: usize },
}

/// Serialise `value` as a single JSON line and append it to the file at
/// `path`, creating the file and its parent directory if needed.
pub fn append_jsonl_line<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonlError> {
    let path_str = path.display().to_string();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(&path_str, e))?;
    }

    let mut line = serde_json::to_vec(value).map_err(|e| json_err(&path_str, e))?;
    line.push(b'\n');
    if line.len() > MAX_LINE_BYTES {
        return Err(JsonlError::LineTooLarge {
            path: path_str,
            limit: MAX_LINE_BYTES,
        });
    }

    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(&path_str, e))?;

    f.lock_exclusive().map_err(|e| io_err(&path_str, e))?;
    let result = (|| {
        f.write_all(&line)?;
        f.sync_data()
    })();
    let _ = f.unlock();
    result.map_err(|e| io_err(&path_str, e))
}

/// Append a record built from the next sequence number after the current
/// max, with the read-compute-append sequence covered by a single
/// exclusive lock so two concurrent callers can never compute the same
/// `next_seq` and silently overwrite each other's line.
///
/// `seq_of` extracts the sequence number of an existing decoded line;
/// `build` receives the computed `next_seq` and produces the record to
/// append, which is also the value returned on success.
pub fn append_with_next_seq<T, F, B>(path: &Path, seq_of: F, build: B) -> Result<T, JsonlError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> u64,
    B: FnOnce(u64) -> T,
{
    let path_str = path.display().to_string();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(&path_str, e))?;
    }

    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(&path_str, e))?;

    f.lock_exclusive().map_err(|e| io_err(&path_str, e))?;
    let result: Result<T, JsonlError> = (|| {
        f.seek(SeekFrom::Start(0)).map_err(|e| io_err(&path_str, e))?;
        let mut max_seq = 0u64;
        {
            let mut reader = std::io::BufReader::new(&mut f);
            for (idx, raw) in (&mut reader).split(b'\n').enumerate() {
                let raw = raw.map_err(|e| io_err(&path_str, e))?;
                if raw.is_empty() {
                    continue;
                }
                if raw.len() > MAX_LINE_BYTES {
                    return Err(JsonlError::LineTooLarge {
                        path: path_str.clone(),
                        limit: MAX_LINE_BYTES,
                    });
                }
                let text = std::str::from_utf8(&raw).map_err(|_| JsonlError::NotUtf8 {
                    path: path_str.clone(),
                    line_no: idx + 1,
                })?;
                let value: T = serde_json::from_str(text).map_err(|e| json_err(&path_str, e))?;
                max_seq = max_seq.max(seq_of(&value));
            }
        }

        let value = build(max_seq + 1);
        let mut line = serde_json::to_vec(&value).map_err(|e| json_err(&path_str, e))?;
        line.push(b'\n');
        if line.len() > MAX_LINE_BYTES {
            return Err(JsonlError::LineTooLarge {
                path: path_str.clone(),
                limit: MAX_LINE_BYTES,
            });
        }
        f.write_all(&line).map_err(|e| io_err(&path_str, e))?;
        f.sync_data().map_err(|e| io_err(&path_str, e))?;
        Ok(value)
    })();
    let _ = f.unlock();
    result
}

/// Read and decode every line in a JSONL file whose sequence number exceeds
/// `since_seq`, using `seq_of` to extract the sequence number of each
/// decoded value without requiring a fixed record shape.
///
/// Malformed or oversize lines are rejected outright: a corrupted log is
/// surfaced as an error rather than silently skipped, since callers use
/// this to replay event/history state.
pub fn read_jsonl_since<T, F>(
    path: &Path,
    since_seq: u64,
    seq_of: F,
) -> Result<Vec<T>, JsonlError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> u64,
{
    let path_str = path.display().to_string();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let f = std::fs::File::open(path).map_err(|e| io_err(&path_str, e))?;
    let reader = std::io::BufReader::new(f);
    let mut out = Vec::new();

    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.map_err(|e| io_err(&path_str, e))?;
        if raw.is_empty() {
            continue;
        }
        if raw.len() > MAX_LINE_BYTES {
            return Err(JsonlError::LineTooLarge {
                path: path_str,
                limit: MAX_LINE_BYTES,
            });
        }
        let text = std::str::from_utf8(&raw).map_err(|_| JsonlError::NotUtf8 {
            path: path_str.clone(),
            line_no: idx + 1,
        })?;
        let value: T = serde_json::from_str(text).map_err(|e| json_err(&path_str, e))?;
        if seq_of(&value) > since_seq {
            out.push(value);
        }
    }

    Ok(out)
}

fn io_err(path: &str, source: std::io::Error) -> JsonlError {
    JsonlError::Io {
        path: path.to_string(),
        source,
    }
}

fn json_err(path: &str, source: serde_json::Error) -> JsonlError {
    JsonlError::Json {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
