// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Coordinator`: a handle to one `<root>` directory of runs and
//! agents. Cheap to clone -- `root`/`clock`/`policy` are plain data, and
//! every operation re-derives state from disk rather than caching it, so
//! multiple coordinator handles (e.g. one per inbound `agent.run`) stay
//! consistent without any in-process locking beyond the per-file OS locks
//! `mesh-storage` already takes.

use crate::error::CoordinatorError;
use crate::policy::CoordinatorPolicy;
use mesh_core::Clock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum attempts when generating a random short-token id before a
/// caller's CreateRun/CreateAgent call gives up with
/// [`CoordinatorError::IdExhausted`].
pub const ID_GEN_MAX_ATTEMPTS: u32 = 8;

#[derive(Clone)]
pub struct Coordinator {
    pub(crate) root: PathBuf,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) policy: CoordinatorPolicy,
}

impl Coordinator {
    pub fn new(root: impl Into<PathBuf>, clock: Arc<dyn Clock>, policy: CoordinatorPolicy) -> Self {
        Self {
            root: root.into(),
            clock,
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> CoordinatorPolicy {
        self.policy
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Generate a fresh id with `tag` (e.g. `"run"`, `"agent"`), retrying on
    /// collision (as determined by `exists`) up to [`ID_GEN_MAX_ATTEMPTS`]
    /// times.
    pub(crate) fn gen_id(
        &self,
        tag: &str,
        exists: impl Fn(&str) -> bool,
    ) -> Result<String, CoordinatorError> {
        for _ in 0..ID_GEN_MAX_ATTEMPTS {
            let candidate = mesh_core::short_token(tag);
            if !exists(&candidate) {
                return Ok(candidate);
            }
        }
        Err(CoordinatorError::IdExhausted {
            attempts: ID_GEN_MAX_ATTEMPTS,
        })
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
