// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable model-client seam. The actual provider integration lives
//! outside this crate; [`WorkerController`](crate::controller::WorkerController)
//! only needs one step of a conversation at a time.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model client error: {0}")]
    Provider(String),
}

/// One step of model output: either a tool the worker must execute before
/// the next step, or a terminal answer.
#[derive(Debug, Clone)]
pub enum LlmStep {
    ToolCall { name: String, arguments: Value },
    Done { output: String },
}

/// Given the conversation so far, produce the next step. `history` holds
/// every message exchanged since the agent started, including synthetic
/// mailbox-drained entries and prior tool results.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn step(&self, history: &[Value]) -> Result<LlmStep, LlmError>;
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
