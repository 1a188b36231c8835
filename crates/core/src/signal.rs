// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal: a named, payload-bearing notification delivered between agents
//! within the same run.

use serde::{Deserialize, Serialize};

/// Well-known signal name used to ask an in-flight worker process to wind
/// down cooperatively ahead of the slave killing its subprocess outright.
pub const AGENT_CANCEL_SIGNAL: &str = "__agent_cancel__";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub name: String,
    pub seq: u64,
    pub at_ms: u64,
    pub payload: serde_json::Value,
}

impl Signal {
    pub fn new(name: impl Into<String>, seq: u64, at_ms: u64, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            seq,
            at_ms,
            payload,
        }
    }

    /// Whether this signal is a match for a waiter on `name` whose cursor is
    /// at `since_seq`: the first matching signal whose sequence number
    /// exceeds the waiter's cursor.
    pub fn matches(&self, name: &str, since_seq: u64) -> bool {
        self.name == name && self.seq > since_seq
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
