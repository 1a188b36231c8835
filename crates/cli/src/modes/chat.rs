// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mesh chat` (the default mode): runs one primary agent in-process
//! against the multi-agent coordinator, reading the task from stdin and
//! printing its event log to stdout. Unlike a cluster-spawned subagent,
//! the primary agent of a chat session is always driven in-process --
//! there is no subprocess boundary to cross for a human sitting at the
//! terminal watching it run.

use crate::config::Config;
use crate::stubs::{UnconfiguredLlmClient, UnconfiguredToolRunner};
use anyhow::{Context, Result};
use clap::ValueEnum;
use mesh_core::SystemClock;
use mesh_coordinator::{Coordinator, CoordinatorPolicy};
use mesh_worker::WorkerController;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChatArgs {}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Plain,
    Tui,
}

impl std::fmt::Display for UiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiMode::Plain => write!(f, "plain"),
            UiMode::Tui => write!(f, "tui"),
        }
    }
}

/// The common flags every mode shares, resolved once in `main` and passed
/// down so `chat` doesn't need to know about clap at all.
pub struct ChatContext {
    pub config: Config,
    pub multi_agent_root: PathBuf,
    pub ui: UiMode,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub mcp_config: Option<PathBuf>,
    pub skills_dir: Option<PathBuf>,
}

pub async fn run(_args: ChatArgs, ctx: ChatContext) -> Result<()> {
    if ctx.ui == UiMode::Tui {
        tracing::warn!("--ui tui is not available in this build, falling back to plain output");
    }
    if ctx.mcp_config.is_some() {
        tracing::warn!("--mcp-config has no effect: no MCP client is built into this workspace");
    }
    if ctx.skills_dir.is_some() {
        tracing::warn!("--skills-dir has no effect: no skill registry is built into this workspace");
    }
    let limits = mesh_core::AgentLimits {
        temperature: ctx.temperature.map(|t| t as f32),
        max_tokens: ctx.max_tokens.map(|t| t as u32),
        max_turns: None,
    };

    std::fs::create_dir_all(&ctx.multi_agent_root).context("creating multi-agent root")?;
    let coordinator = Coordinator::new(ctx.multi_agent_root, Arc::new(SystemClock), CoordinatorPolicy::default());

    print!("You: ");
    std::io::stdout().flush().ok();
    let mut task = String::new();
    std::io::stdin().read_line(&mut task).context("reading task from stdin")?;
    let task = task.trim().to_string();
    if task.is_empty() {
        println!("no task given, exiting");
        return Ok(());
    }

    let mut metadata = std::collections::HashMap::new();
    metadata.insert("source".to_string(), "chat".to_string());
    let run = coordinator.create_run(metadata).context("creating run")?;
    let agent = coordinator
        .create_agent(run.id.as_str(), task.clone(), limits, serde_json::Value::Null, false)
        .context("creating agent")?;
    coordinator
        .send_message(run.id.as_str(), agent.id.as_str(), serde_json::json!({"role": "user", "content": task}))
        .context("sending initial task")?;

    let controller = WorkerController::new(
        coordinator.clone(),
        run.id.as_str(),
        agent.id.as_str(),
        Arc::new(UnconfiguredLlmClient),
        Arc::new(UnconfiguredToolRunner),
    );

    if let Err(e) = controller.run().await {
        println!("agent failed: {e}");
        return Ok(());
    }

    match coordinator.read_result(run.id.as_str(), agent.id.as_str()) {
        Ok(result) => println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default()),
        Err(e) => println!("no result recorded: {e}"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
