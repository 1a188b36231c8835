// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholders for the two external collaborators this workspace never
//! implements: the model provider's request/response client and the
//! skill/tool plug-in registry. Every wiring point that needs an
//! [`LlmClient`]/[`ToolRunner`] is fully built; these stand in until a
//! real provider and registry are plugged in, the same way `skills` is a
//! present-but-stub subcommand rather than a missing one.

use async_trait::async_trait;
use mesh_worker::{LlmClient, LlmError, LlmStep, ToolOutcome, ToolRunner};
use serde_json::Value;

pub struct UnconfiguredLlmClient;

#[async_trait]
impl LlmClient for UnconfiguredLlmClient {
    async fn step(&self, _history: &[Value]) -> Result<LlmStep, LlmError> {
        Err(LlmError::Provider(
            "no model provider is configured for this worker".to_string(),
        ))
    }
}

pub struct UnconfiguredToolRunner;

#[async_trait]
impl ToolRunner for UnconfiguredToolRunner {
    async fn call(&self, name: &str, _arguments: &Value) -> ToolOutcome {
        ToolOutcome::failed(format!("no tool registry is configured to run '{name}'"))
    }
}

#[cfg(test)]
#[path = "stubs_tests.rs"]
mod tests;
