// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable tool-execution seam. Tool/skill registries are out of
//! scope for this crate; [`WorkerController`](crate::controller::WorkerController)
//! only needs to invoke one by name and observe its outcome.

use async_trait::async_trait;
use serde_json::Value;

/// Outcome of one tool invocation. Never an `Err` -- a failing tool is a
/// normal outcome the model sees via `error`, not a worker-fatal condition.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub result: Value,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(result: Value) -> Self {
        Self { result, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { result: Value::Null, error: Some(message.into()) }
    }
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn call(&self, name: &str, arguments: &Value) -> ToolOutcome;
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
