// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CreateRun, ListRuns, Prune.

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::paths;
use mesh_core::{Run, RunId, RunStatus};
use mesh_storage::{read_json, write_json_atomic, FileMode};
use std::collections::HashMap;

/// Filter applied by [`Coordinator::list_runs`].
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub status: Option<RunStatus>,
    /// Case-insensitive substring match against any metadata value.
    pub text: Option<String>,
}

impl RunFilter {
    fn matches(&self, run: &Run) -> bool {
        if let Some(status) = self.status {
            if run.status != status {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = run
                .metadata
                .values()
                .any(|v| v.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Parameters for [`Coordinator::prune`].
#[derive(Debug, Clone, Default)]
pub struct PrunePolicy {
    pub max_age_ms: Option<u64>,
    pub max_count: Option<usize>,
}

impl Coordinator {
    pub fn create_run(&self, metadata: HashMap<String, String>) -> Result<Run, CoordinatorError> {
        let id = self.gen_id("run", |candidate| {
            paths::run_json(&self.root, candidate).exists()
        })?;
        let run = Run::new(RunId::new(id), self.clock.now_ms(), metadata);
        write_json_atomic(&paths::run_json(&self.root, run.id.as_str()), &run, FileMode::Shared)?;
        Ok(run)
    }

    pub fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>, CoordinatorError> {
        let mut runs = self.read_all_runs()?;
        runs.retain(|r| filter.matches(r));
        runs.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(runs)
    }

    pub fn get_run(&self, run_id: &str) -> Result<Run, CoordinatorError> {
        read_json(&paths::run_json(&self.root, run_id))
            .map_err(|_| CoordinatorError::RunNotFound(run_id.to_string()))
    }

    pub fn close_run(&self, run_id: &str) -> Result<Run, CoordinatorError> {
        let mut run = self.get_run(run_id)?;
        run.close();
        write_json_atomic(&paths::run_json(&self.root, run_id), &run, FileMode::Shared)?;
        Ok(run)
    }

    /// Delete runs older than `policy.max_age_ms` or beyond
    /// `policy.max_count`, always keeping the `prune_min_keep` most recent
    /// runs regardless of cutoffs. Returns the ids of runs deleted.
    pub fn prune(&self, policy: &PrunePolicy) -> Result<Vec<String>, CoordinatorError> {
        let mut runs = self.read_all_runs()?;
        runs.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));

        let now_ms = self.clock.now_ms();
        let min_keep = self.policy.prune_min_keep;
        let mut deleted = Vec::new();

        for (idx, run) in runs.iter().enumerate() {
            if idx < min_keep {
                continue;
            }
            let too_old = policy
                .max_age_ms
                .is_some_and(|max_age| now_ms.saturating_sub(run.created_at_ms) > max_age);
            let over_count = policy.max_count.is_some_and(|max_count| idx >= max_count);
            if too_old || over_count {
                let dir = paths::run_dir(&self.root, run.id.as_str());
                std::fs::remove_dir_all(&dir)?;
                deleted.push(run.id.as_str().to_string());
            }
        }

        Ok(deleted)
    }

    fn read_all_runs(&self) -> Result<Vec<Run>, CoordinatorError> {
        let mut runs = Vec::new();
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(runs),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let run_json = entry.path().join("run.json");
            if let Ok(run) = read_json::<Run>(&run_json) {
                runs.push(run);
            }
        }
        Ok(runs)
    }
}

#[cfg(test)]
#[path = "run_ops_tests.rs"]
mod tests;
