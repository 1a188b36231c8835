// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CreateAgent, ReadState/UpdateState/WriteResult, SpawnWorker, and the
//! Hide/Show/List visibility toggles.

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::paths;
use mesh_core::{Agent, AgentId, AgentLimits, AgentSpec, AgentStatus};
use mesh_storage::{read_json, write_json_atomic, FileMode};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command};

/// Exec parameters for [`Coordinator::spawn_worker`]. `binary` defaults to
/// the current executable (`std::env::current_exe`) so a master/slave
/// process relaunches itself in worker mode without the caller having to
/// know its own path.
#[derive(Debug, Clone, Default)]
pub struct WorkerExecInfo {
    pub binary: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub extra_env: HashMap<String, String>,
}

/// Environment variable naming the run directory a spawned worker should
/// discover itself through, alongside `--run-id`/`--agent-id` CLI flags.
pub const ENV_WORKER_ROOT: &str = "MESH_WORKER_ROOT";

impl Coordinator {
    pub fn create_agent(
        &self,
        run_id: &str,
        task: String,
        limits: AgentLimits,
        metadata: serde_json::Value,
        hidden: bool,
    ) -> Result<Agent, CoordinatorError> {
        self.get_run(run_id)?;

        let id = self.gen_id("agent", |candidate| {
            paths::spec_json(&self.root, run_id, candidate).exists()
        })?;
        let agent_id = AgentId::new(id);

        let spec = AgentSpec {
            id: agent_id.clone(),
            task,
            limits,
            metadata,
            hidden,
        };
        write_json_atomic(
            &paths::spec_json(&self.root, run_id, agent_id.as_str()),
            &spec,
            FileMode::Shared,
        )?;

        let mut state = Agent::pending(agent_id.clone(), self.clock.now_ms());
        state.hidden = hidden;
        write_json_atomic(
            &paths::state_json(&self.root, run_id, agent_id.as_str()),
            &state,
            FileMode::Shared,
        )?;

        Ok(state)
    }

    pub fn read_spec(&self, run_id: &str, agent_id: &str) -> Result<AgentSpec, CoordinatorError> {
        read_json(&paths::spec_json(&self.root, run_id, agent_id))
            .map_err(|_| CoordinatorError::AgentNotFound(agent_id.to_string()))
    }

    /// Reads `state.json`, reclassifying a `running` agent whose heartbeat
    /// is older than the coordinator's staleness threshold as `failed`.
    pub fn read_state(&self, run_id: &str, agent_id: &str) -> Result<Agent, CoordinatorError> {
        let mut agent: Agent = read_json(&paths::state_json(&self.root, run_id, agent_id))
            .map_err(|_| CoordinatorError::AgentNotFound(agent_id.to_string()))?;

        if agent.is_stale(self.clock.now_ms(), self.policy.staleness_threshold_ms) {
            let message = "worker heartbeat went stale".to_string();
            agent.status = AgentStatus::Failed;
            agent.error = Some(message.clone());
            agent.finished_at_ms = Some(self.clock.now_ms());
            agent.pid = None;
            write_json_atomic(
                &paths::state_json(&self.root, run_id, agent_id),
                &agent,
                FileMode::Shared,
            )?;
            self.write_result(run_id, agent_id, &serde_json::json!({ "error": message }))?;
        }

        Ok(agent)
    }

    /// Atomically transitions `state.json`, rejecting backward transitions
    /// per [`AgentStatus::can_transition_to`].
    pub fn update_state(
        &self,
        run_id: &str,
        agent_id: &str,
        mutate: impl FnOnce(&mut Agent),
    ) -> Result<Agent, CoordinatorError> {
        let mut agent: Agent = read_json(&paths::state_json(&self.root, run_id, agent_id))
            .map_err(|_| CoordinatorError::AgentNotFound(agent_id.to_string()))?;
        let before = agent.status;

        let mut next = agent.clone();
        mutate(&mut next);
        next.updated_at_ms = self.clock.now_ms();

        if !before.can_transition_to(next.status) {
            return Err(CoordinatorError::InvalidTransition {
                agent_id: agent_id.to_string(),
                from: before.to_string(),
                to: next.status.to_string(),
            });
        }

        write_json_atomic(
            &paths::state_json(&self.root, run_id, agent_id),
            &next,
            FileMode::Shared,
        )?;
        agent = next;
        Ok(agent)
    }

    pub fn write_result(
        &self,
        run_id: &str,
        agent_id: &str,
        result: &serde_json::Value,
    ) -> Result<(), CoordinatorError> {
        write_json_atomic(
            &paths::result_json(&self.root, run_id, agent_id),
            result,
            FileMode::Shared,
        )?;
        Ok(())
    }

    pub fn read_result(
        &self,
        run_id: &str,
        agent_id: &str,
    ) -> Result<serde_json::Value, CoordinatorError> {
        read_json(&paths::result_json(&self.root, run_id, agent_id))
            .map_err(|_| CoordinatorError::AgentNotFound(agent_id.to_string()))
    }

    /// Launches the same binary with worker-mode arguments and a sentinel
    /// environment, recording the pid in `state.json` before returning.
    pub fn spawn_worker(
        &self,
        run_id: &str,
        agent_id: &str,
        exec: &WorkerExecInfo,
    ) -> Result<u32, CoordinatorError> {
        self.read_spec(run_id, agent_id)?;

        let binary = match &exec.binary {
            Some(path) => path.clone(),
            None => std::env::current_exe()?,
        };

        let mut command = Command::new(binary);
        command
            .arg("worker")
            .arg("--run-id")
            .arg(run_id)
            .arg("--agent-id")
            .arg(agent_id)
            .args(&exec.extra_args)
            .env(ENV_WORKER_ROOT, &self.root)
            .envs(&exec.extra_env);

        // Liveness is tracked through state.json's heartbeat, not by
        // waiting on the child handle.
        let child: Child = command.spawn()?;
        let pid = child.id();

        self.update_state(run_id, agent_id, |agent| {
            agent.status = AgentStatus::Running;
            agent.started_at_ms.get_or_insert(self.clock.now_ms());
            agent.pid = Some(pid);
        })?;

        Ok(pid)
    }

    /// Sends the spawned worker process a termination signal, if
    /// `state.json` still records a pid. Best-effort: a process that has
    /// already exited is not an error.
    pub fn cancel_worker(&self, run_id: &str, agent_id: &str) -> Result<(), CoordinatorError> {
        let agent = self.read_state(run_id, agent_id)?;
        if let Some(pid) = agent.pid {
            terminate_pid(pid);
        }
        Ok(())
    }

    pub fn hide_agent(&self, run_id: &str, agent_id: &str) -> Result<Agent, CoordinatorError> {
        self.update_state(run_id, agent_id, |agent| agent.hidden = true)
    }

    pub fn show_agent(&self, run_id: &str, agent_id: &str) -> Result<Agent, CoordinatorError> {
        self.update_state(run_id, agent_id, |agent| agent.hidden = false)
    }

    pub fn list_agents(
        &self,
        run_id: &str,
        include_hidden: bool,
    ) -> Result<Vec<Agent>, CoordinatorError> {
        let dir = paths::agents_dir(&self.root, run_id);
        let mut agents = Vec::new();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(agents),
            Err(e) => return Err(CoordinatorError::Io(e)),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(agent_id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Ok(agent) = self.read_state(run_id, &agent_id) {
                if include_hidden || !agent.hidden {
                    agents.push(agent);
                }
            }
        }
        agents.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(agents)
    }
}

#[cfg(unix)]
fn terminate_pid(pid: u32) {
    let _ = Command::new("kill").arg("-TERM").arg(pid.to_string()).status();
}

#[cfg(not(unix))]
fn terminate_pid(pid: u32) {
    let _ = Command::new("taskkill").args(["/PID", &pid.to_string(), "/F"]).status();
}

#[cfg(test)]
#[path = "agent_ops_tests.rs"]
mod tests;
