// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run entity: a top-level directory grouping one or more agents that
//! collaborate on a task.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a run, formatted as `run_<token>`.
    pub struct RunId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: RunId,
    pub created_at_ms: u64,
    pub status: RunStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Run {
    pub fn new(id: RunId, created_at_ms: u64, metadata: HashMap<String, String>) -> Self {
        Self {
            id,
            created_at_ms,
            status: RunStatus::Open,
            metadata,
        }
    }

    pub fn close(&mut self) {
        self.status = RunStatus::Closed;
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
