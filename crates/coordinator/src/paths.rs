// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout under the coordinator's root directory:
//!
//! ```text
//! <root>/<run-id>/
//!   run.json
//!   signals.jsonl
//!   agents/<agent-id>/
//!     spec.json
//!     state.json
//!     result.json
//!     history.jsonl
//!     events.jsonl
//!     asset/
//! ```

use std::path::{Path, PathBuf};

pub fn run_dir(root: &Path, run_id: &str) -> PathBuf {
    root.join(run_id)
}

pub fn run_json(root: &Path, run_id: &str) -> PathBuf {
    run_dir(root, run_id).join("run.json")
}

pub fn signals_jsonl(root: &Path, run_id: &str) -> PathBuf {
    run_dir(root, run_id).join("signals.jsonl")
}

pub fn agents_dir(root: &Path, run_id: &str) -> PathBuf {
    run_dir(root, run_id).join("agents")
}

pub fn agent_dir(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agents_dir(root, run_id).join(agent_id)
}

pub fn spec_json(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("spec.json")
}

pub fn state_json(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("state.json")
}

pub fn result_json(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("result.json")
}

pub fn history_jsonl(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("history.jsonl")
}

pub fn events_jsonl(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("events.jsonl")
}

pub fn asset_dir(root: &Path, run_id: &str, agent_id: &str) -> PathBuf {
    agent_dir(root, run_id, agent_id).join("asset")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
