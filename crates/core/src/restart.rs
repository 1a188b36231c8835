// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart sentinel: a single versioned record a running process writes to
//! ask to be relaunched, consumed by the next started process.

use serde::{Deserialize, Serialize};

/// Current restart-sentinel record version.
pub const RESTART_SENTINEL_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartKind {
    Master,
    Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartStatus {
    Requested,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestartSentinelRecord {
    pub version: u32,
    pub kind: RestartKind,
    pub status: RestartStatus,
    pub requested_at_ms: u64,
    pub pid: u32,
    pub note: String,
}

impl RestartSentinelRecord {
    pub fn new(kind: RestartKind, requested_at_ms: u64, pid: u32, note: impl Into<String>) -> Self {
        Self {
            version: RESTART_SENTINEL_VERSION,
            kind,
            status: RestartStatus::Requested,
            requested_at_ms,
            pid,
            note: note.into(),
        }
    }
}

/// Exit code the supervisor loop interprets as "respawn me".
pub const SUPERVISOR_RESTART_EXIT_CODE: i32 = 23;

/// Set by the supervisor loop on every child it launches, so a process
/// that requests its own restart knows to exit with
/// [`SUPERVISOR_RESTART_EXIT_CODE`] instead of re-executing itself in
/// place (the supervisor already owns respawning).
pub const ENV_SUPERVISOR_CHILD: &str = "MESH_SUPERVISOR_CHILD";

/// Set by an operator who wants a restart request to always re-exec in
/// place, even under a supervisor loop.
pub const ENV_SUPERVISOR_DISABLE: &str = "MESH_SUPERVISOR_DISABLE";

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
