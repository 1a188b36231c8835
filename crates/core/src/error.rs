// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of error kinds surfaced at every control-plane interface.
//! Every crate-local error (`thiserror`-derived, rich and specific to its
//! own seam) maps onto one of these at the boundary instead of leaking its
//! internal shape across the slave/worker/master divide.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed error-kind taxonomy shared by the wire protocol and the
/// coordinator's public operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad signature, stale timestamp, replayed nonce, or version mismatch.
    AuthFailed,
    /// No live channel for the target slave.
    Offline,
    /// Deadline elapsed before a reply/result arrived.
    Timeout,
    /// Slave at its max in-flight capacity.
    Busy,
    /// Request or handler was cancelled.
    Cancelled,
    /// Malformed/oversize frame, or an unknown message kind.
    ProtocolError,
    /// Handler reported failure with a message.
    RemoteError,
    /// Underlying transport or filesystem error.
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::AuthFailed => "auth_failed",
            ErrorKind::Offline => "offline",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Busy => "busy",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::ProtocolError => "protocol_error",
            ErrorKind::RemoteError => "remote_error",
            ErrorKind::IoError => "io_error",
        };
        write!(f, "{s}")
    }
}

/// Default preview length for user-visible failure messages.
pub const DEFAULT_PREVIEW_CHARS: usize = 320;

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis marker when truncated. Operates on `char` boundaries so it
/// never panics on multi-byte UTF-8 input.
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
