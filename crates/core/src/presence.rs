// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presence record: a serialised snapshot of a registry entry, keyed by
//! slave id, written with a TTL. Presence is advisory -- the registry is
//! authoritative within a single master instance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceRecord {
    pub slave_id: String,
    pub status: PresenceStatus,
    pub display_name: String,
    pub updated_at_secs: u64,
}

impl PresenceRecord {
    pub fn online(slave_id: impl Into<String>, display_name: impl Into<String>, now: u64) -> Self {
        Self {
            slave_id: slave_id.into(),
            status: PresenceStatus::Online,
            display_name: display_name.into(),
            updated_at_secs: now,
        }
    }
}

/// Minimum floor for the presence TTL, regardless of the configured
/// heartbeat interval.
pub const PRESENCE_TTL_FLOOR_SECS: u64 = 15;

/// Compute the presence TTL for a given heartbeat interval: three intervals,
/// floored at [`PRESENCE_TTL_FLOOR_SECS`].
pub fn presence_ttl_secs(heartbeat_interval_secs: u64) -> u64 {
    (heartbeat_interval_secs * 3).max(PRESENCE_TTL_FLOOR_SECS)
}

#[cfg(test)]
#[path = "presence_tests.rs"]
mod tests;
