// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mesh worker`: drives one agent to completion. Not meant for humans --
//! invoked by [`mesh_coordinator::Coordinator::spawn_worker`] with
//! `MESH_WORKER_ROOT` set and `--run-id`/`--agent-id` supplied, though
//! nothing stops a human from invoking it directly for testing.

use crate::stubs::{UnconfiguredLlmClient, UnconfiguredToolRunner};
use anyhow::{Context, Result};
use mesh_coordinator::{Coordinator, CoordinatorPolicy, ENV_WORKER_ROOT};
use mesh_core::SystemClock;
use mesh_worker::WorkerController;
use std::sync::Arc;

#[derive(clap::Args, Debug, Clone)]
pub struct WorkerArgs {
    #[arg(long)]
    pub run_id: String,
    #[arg(long)]
    pub agent_id: String,
}

pub async fn run(args: WorkerArgs) -> Result<()> {
    let root = std::env::var_os(ENV_WORKER_ROOT)
        .with_context(|| format!("{ENV_WORKER_ROOT} is not set; `worker` is launched by the coordinator, not run directly"))?;

    let coordinator = Coordinator::new(root, Arc::new(SystemClock), CoordinatorPolicy::default());
    let controller = WorkerController::new(
        coordinator,
        args.run_id,
        args.agent_id,
        Arc::new(UnconfiguredLlmClient),
        Arc::new(UnconfiguredToolRunner),
    );

    controller.run().await.context("worker run")?;
    Ok(())
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
