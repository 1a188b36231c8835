// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker controller: liveness heartbeat, mailbox draining ahead of
//! each model call, tool-call event wrapping, and a defensive failure
//! write if the process exits without ever reaching a terminal state.

use crate::error::WorkerError;
use crate::llm::{LlmClient, LlmStep};
use crate::tool::ToolRunner;
use mesh_core::{preview, AgentEventKind, AgentStatus, AGENT_CANCEL_SIGNAL, TOOL_PREVIEW_CHARS};
use mesh_coordinator::Coordinator;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Interval between heartbeat touches of `state.json` while a model or
/// tool call is in flight.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// How long the background cancel-watch keeps polling for
/// [`AGENT_CANCEL_SIGNAL`] before giving up; in practice it is always cut
/// short by `run()` cancelling its stop token once `drive()` finishes.
const CANCEL_WATCH_TIMEOUT: Duration = Duration::from_secs(24 * 3600);

/// Terminal shape of [`WorkerController::drive`]: either the agent
/// produced a final answer, or cancellation was observed mid-loop.
enum DriveOutcome {
    Done(String),
    Cancelled,
}

pub struct WorkerController {
    coordinator: Coordinator,
    run_id: String,
    agent_id: String,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRunner>,
}

impl WorkerController {
    pub fn new(
        coordinator: Coordinator,
        run_id: impl Into<String>,
        agent_id: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            coordinator,
            run_id: run_id.into(),
            agent_id: agent_id.into(),
            llm,
            tools,
        }
    }

    /// Drive the agent from `pending` to a terminal state. Marks the
    /// agent `running` with this process's pid on entry; guarantees a
    /// `failed` result is written if this future is dropped (process
    /// killed, panic unwound through it) before a terminal write happens.
    pub async fn run(&self) -> Result<(), WorkerError> {
        let now = self.coordinator.now_ms();
        self.coordinator.update_state(&self.run_id, &self.agent_id, |agent| {
            agent.status = AgentStatus::Running;
            agent.started_at_ms.get_or_insert(now);
            agent.pid = Some(std::process::id());
        })?;

        let mut guard = FailureGuard::armed(&self.coordinator, &self.run_id, &self.agent_id);

        let busy = Arc::new(AtomicBool::new(false));
        let heartbeat_cancel = CancellationToken::new();
        let heartbeat = self.spawn_heartbeat(busy.clone(), heartbeat_cancel.clone());

        let cancel = CancellationToken::new();
        let watch_stop = CancellationToken::new();
        let cancel_watch = self.spawn_cancel_watch(cancel.clone(), watch_stop.clone());

        let outcome = self.drive(&busy, &cancel).await;

        heartbeat_cancel.cancel();
        let _ = heartbeat.await;
        watch_stop.cancel();
        let _ = cancel_watch.await;

        let finished_at = self.coordinator.now_ms();
        match outcome {
            Ok(DriveOutcome::Done(output)) => {
                self.coordinator.write_result(&self.run_id, &self.agent_id, &serde_json::json!({"output": output}))?;
                self.coordinator.update_state(&self.run_id, &self.agent_id, |agent| {
                    agent.status = AgentStatus::Completed;
                    agent.finished_at_ms = Some(finished_at);
                    agent.pid = None;
                })?;
                guard.disarm();
                Ok(())
            }
            Ok(DriveOutcome::Cancelled) => {
                self.coordinator.write_result(&self.run_id, &self.agent_id, &serde_json::json!({"status": "cancelled"}))?;
                self.coordinator.update_state(&self.run_id, &self.agent_id, |agent| {
                    agent.status = AgentStatus::Cancelled;
                    agent.finished_at_ms = Some(finished_at);
                    agent.pid = None;
                })?;
                guard.disarm();
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.coordinator.write_result(&self.run_id, &self.agent_id, &serde_json::json!({"error": message}))?;
                self.coordinator.update_state(&self.run_id, &self.agent_id, |agent| {
                    agent.status = AgentStatus::Failed;
                    agent.error = Some(message.clone());
                    agent.finished_at_ms = Some(finished_at);
                    agent.pid = None;
                })?;
                guard.disarm();
                Err(e)
            }
        }
    }

    async fn drive(&self, busy: &Arc<AtomicBool>, cancel: &CancellationToken) -> Result<DriveOutcome, WorkerError> {
        let mut history: Vec<Value> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                return Ok(DriveOutcome::Cancelled);
            }

            for message in self.coordinator.drain_mailbox(&self.run_id, &self.agent_id)? {
                history.push(message.payload.clone());
                self.coordinator.append_event(
                    &self.run_id,
                    &self.agent_id,
                    AgentEventKind::Message {
                        seq: message.seq,
                        role: "user".to_string(),
                        preview: preview(&message.payload.to_string(), TOOL_PREVIEW_CHARS),
                    },
                )?;
            }

            busy.store(true, Ordering::SeqCst);
            let step = tokio::select! {
                step = self.llm.step(&history) => step,
                _ = cancel.cancelled() => return Ok(DriveOutcome::Cancelled),
            };
            busy.store(false, Ordering::SeqCst);

            match step? {
                LlmStep::Done { output } => return Ok(DriveOutcome::Done(output)),
                LlmStep::ToolCall { name, arguments } => {
                    history.push(serde_json::json!({
                        "role": "assistant",
                        "tool_call": name,
                        "arguments": arguments,
                    }));

                    self.coordinator.append_event(
                        &self.run_id,
                        &self.agent_id,
                        AgentEventKind::ToolStart {
                            name: name.clone(),
                            argument_preview: preview(&arguments.to_string(), TOOL_PREVIEW_CHARS),
                        },
                    )?;

                    busy.store(true, Ordering::SeqCst);
                    let started = Instant::now();
                    let outcome = tokio::select! {
                        outcome = self.tools.call(&name, &arguments) => outcome,
                        _ = cancel.cancelled() => return Ok(DriveOutcome::Cancelled),
                    };
                    let duration_ms = started.elapsed().as_millis() as u64;
                    busy.store(false, Ordering::SeqCst);

                    self.coordinator.append_event(
                        &self.run_id,
                        &self.agent_id,
                        AgentEventKind::ToolDone {
                            name: name.clone(),
                            duration_ms,
                            result_preview: preview(&outcome.result.to_string(), TOOL_PREVIEW_CHARS),
                            error_preview: outcome.error.as_deref().map(|e| preview(e, TOOL_PREVIEW_CHARS)),
                        },
                    )?;

                    history.push(serde_json::json!({
                        "role": "tool",
                        "name": name,
                        "result": outcome.result,
                        "error": outcome.error,
                    }));
                }
            }
        }
    }

    /// Polls for [`AGENT_CANCEL_SIGNAL`] in the background and cancels
    /// `cancel` once observed, letting [`Self::drive`] wind down at its
    /// next check instead of being killed mid-step. `stop` is cancelled by
    /// `run()` once `drive()` returns, ending the watch promptly either way.
    fn spawn_cancel_watch(&self, cancel: CancellationToken, stop: CancellationToken) -> tokio::task::JoinHandle<()> {
        let coordinator = self.coordinator.clone();
        let run_id = self.run_id.clone();
        tokio::spawn(async move {
            if coordinator
                .wait_signal(&run_id, AGENT_CANCEL_SIGNAL, 0, CANCEL_WATCH_TIMEOUT, &stop)
                .await
                .is_ok()
            {
                cancel.cancel();
            }
        })
    }

    fn spawn_heartbeat(&self, busy: Arc<AtomicBool>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let coordinator = self.coordinator.clone();
        let run_id = self.run_id.clone();
        let agent_id = self.agent_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(HEARTBEAT_INTERVAL) => {
                        if busy.load(Ordering::SeqCst) {
                            let _ = coordinator.update_state(&run_id, &agent_id, |_| {});
                        }
                    }
                }
            }
        })
    }
}

/// Arms a defensive `failed` write on drop, disarmed only once a real
/// terminal write has succeeded. Covers process kill and panic-unwind
/// exits that never reach the normal completion path in [`WorkerController::run`].
struct FailureGuard<'a> {
    coordinator: &'a Coordinator,
    run_id: &'a str,
    agent_id: &'a str,
    armed: bool,
}

impl<'a> FailureGuard<'a> {
    fn armed(coordinator: &'a Coordinator, run_id: &'a str, agent_id: &'a str) -> Self {
        Self { coordinator, run_id, agent_id, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FailureGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        const MESSAGE: &str = "worker exited without a terminal write";
        let _ = self
            .coordinator
            .write_result(self.run_id, self.agent_id, &serde_json::json!({"error": MESSAGE}));
        let _ = self.coordinator.update_state(self.run_id, self.agent_id, |agent| {
            agent.status = AgentStatus::Failed;
            agent.error = Some(MESSAGE.to_string());
            agent.pid = None;
        });
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
