// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable handler contract for inbound `agent.run` frames, plus the
//! built-in handler that delegates to the multi-agent coordinator.

use async_trait::async_trait;
use mesh_coordinator::{Coordinator, WorkerExecInfo};
use mesh_core::{AgentLimits, AgentStatus, AGENT_CANCEL_SIGNAL};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Interval at which the built-in handler re-polls the coordinator for new
/// events and a terminal state while a spawned worker runs.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Terminal outcome of a handled `agent.run`, translated back into an
/// `agent.result` envelope by the caller.
#[derive(Debug, Clone)]
pub struct AgentRunOutcome {
    pub status: String,
    pub output: Option<String>,
    pub run_id: Option<String>,
    pub error: Option<String>,
}

impl AgentRunOutcome {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            output: None,
            run_id: None,
            error: Some(message.into()),
        }
    }
}

/// Given `(task, options, metadata)`, runs an agent to completion and
/// streams its intermediate events out through `events`. Implementations
/// must honor `cancel` as best-effort: a cancelled run may still finish
/// its terminal reply with `status = "cancelled"`.
#[async_trait]
pub trait AgentRunHandler: Send + Sync {
    async fn run(
        &self,
        task: String,
        options: Value,
        metadata: Value,
        events: mpsc::UnboundedSender<Value>,
        cancel: CancellationToken,
    ) -> AgentRunOutcome;
}

/// Built-in handler: creates a coordinator run tagged `source =
/// "cluster_slave"`, records the task as the primary agent's first mailbox
/// line, spawns a worker subprocess, and relays its event log back to the
/// caller until the agent reaches a terminal state.
pub struct CoordinatorHandler {
    coordinator: Coordinator,
    exec: WorkerExecInfo,
}

impl CoordinatorHandler {
    pub fn new(coordinator: Coordinator, exec: WorkerExecInfo) -> Self {
        Self { coordinator, exec }
    }
}

fn metadata_to_run_fields(metadata: &Value) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert("source".to_string(), "cluster_slave".to_string());
    if let Value::Object(map) = metadata {
        for (key, value) in map {
            let as_string = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.insert(key.clone(), as_string);
        }
    }
    fields
}

#[async_trait]
impl AgentRunHandler for CoordinatorHandler {
    async fn run(
        &self,
        task: String,
        options: Value,
        metadata: Value,
        events: mpsc::UnboundedSender<Value>,
        cancel: CancellationToken,
    ) -> AgentRunOutcome {
        let run = match self.coordinator.create_run(metadata_to_run_fields(&metadata)) {
            Ok(run) => run,
            Err(e) => return AgentRunOutcome::error(e.to_string()),
        };

        let agent = match self.coordinator.create_agent(
            run.id.as_str(),
            task.clone(),
            AgentLimits::default(),
            options,
            false,
        ) {
            Ok(agent) => agent,
            Err(e) => return AgentRunOutcome::error(e.to_string()),
        };

        if let Err(e) = self.coordinator.send_message(
            run.id.as_str(),
            agent.id.as_str(),
            serde_json::json!({"role": "user", "content": task}),
        ) {
            return AgentRunOutcome::error(e.to_string());
        }

        if let Err(e) = self.coordinator.spawn_worker(run.id.as_str(), agent.id.as_str(), &self.exec) {
            return AgentRunOutcome::error(e.to_string());
        }

        self.poll_until_terminal(run.id.as_str(), agent.id.as_str(), events, cancel).await
    }
}

impl CoordinatorHandler {
    async fn poll_until_terminal(
        &self,
        run_id: &str,
        agent_id: &str,
        events: mpsc::UnboundedSender<Value>,
        cancel: CancellationToken,
    ) -> AgentRunOutcome {
        let mut since_seq = 0u64;
        loop {
            match self.coordinator.read_events(run_id, agent_id, since_seq) {
                Ok(batch) => {
                    for event in batch {
                        since_seq = since_seq.max(event.seq);
                        let _ = events.send(serde_json::json!(event));
                    }
                }
                Err(e) => return AgentRunOutcome::error(e.to_string()),
            }

            let agent = match self.coordinator.read_state(run_id, agent_id) {
                Ok(agent) => agent,
                Err(e) => return AgentRunOutcome::error(e.to_string()),
            };

            if agent.status.is_terminal() {
                return self.terminal_outcome(run_id, agent_id, agent.status);
            }

            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
                _ = cancel.cancelled() => {
                    // Give the worker a chance to wind down on its own via
                    // the signal before force-killing its process.
                    let _ = self.coordinator.send_signal(run_id, AGENT_CANCEL_SIGNAL, serde_json::json!({}));
                    let _ = self.coordinator.cancel_worker(run_id, agent_id);
                    return AgentRunOutcome {
                        status: "cancelled".to_string(),
                        output: None,
                        run_id: Some(run_id.to_string()),
                        error: None,
                    };
                }
            }
        }
    }

    fn terminal_outcome(&self, run_id: &str, agent_id: &str, status: AgentStatus) -> AgentRunOutcome {
        let result = self.coordinator.read_result(run_id, agent_id).ok();
        let output = result
            .as_ref()
            .and_then(|v| v.get("output"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let error = result
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        AgentRunOutcome {
            status: status.to_string(),
            output,
            run_id: Some(run_id.to_string()),
            error,
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
