// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh - cluster control plane and multi-agent coordinator CLI.

mod config;
mod logging;
mod modes;
mod shutdown;
mod stubs;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use modes::chat::{ChatArgs, ChatContext, UiMode};
use modes::master::MasterArgs;
use modes::skills::SkillsArgs;
use modes::slave::SlaveArgs;
use modes::worker::WorkerArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mesh", version, about = "Cluster control plane and multi-agent coordinator")]
struct Cli {
    /// Path to the config file (default: per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// MCP server config (accepted for forward-compatibility; no MCP client is built in)
    #[arg(long = "mcp-config", global = true)]
    mcp_config: Option<PathBuf>,
    /// Skill directory (accepted for forward-compatibility; no skill registry is built in)
    #[arg(long = "skills-dir", global = true)]
    skills_dir: Option<PathBuf>,
    /// Root directory for run/agent state
    #[arg(long = "multi-agent-root", global = true)]
    multi_agent_root: Option<PathBuf>,
    /// Output style for chat mode
    #[arg(long, global = true, value_enum, default_value_t)]
    ui: UiMode,
    #[arg(long, global = true)]
    temperature: Option<f64>,
    #[arg(long = "max-tokens", global = true)]
    max_tokens: Option<u64>,
    /// Write a default config file if one does not already exist, then exit
    #[arg(long, global = true)]
    init: bool,
    /// Override the tracing filter (defaults to RUST_LOG, then "info")
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,
    /// Log file path for long-running modes (default: per-user config directory)
    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive single-agent chat (default)
    Chat(ChatArgs),
    /// Run the control-plane gateway
    Master(MasterArgs),
    /// Connect to a master as a worker node
    Slave(SlaveArgs),
    /// Drive one agent to completion (launched by the coordinator)
    Worker(WorkerArgs),
    /// Skill/tool registry (stub)
    Skills(SkillsArgs),
}

fn main() {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(run(cli));
    std::process::exit(code);
}

async fn run(cli: Cli) -> i32 {
    let long_running = matches!(
        cli.command,
        Some(Commands::Master(_)) | Some(Commands::Slave(_)) | Some(Commands::Worker(_))
    );
    let _guard = match logging::init(!long_running, cli.log_level.as_deref(), cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e}");
            return 1;
        }
    };

    if let Err(e) = dispatch(cli).await {
        tracing::error!(error = %e, "{e}");
        eprintln!("Error: {e:#}");
        return 1;
    }
    0
}

async fn dispatch(cli: Cli) -> Result<()> {
    if cli.init {
        return run_init(cli.config.as_deref());
    }

    let config = Config::load(cli.config.as_deref())?;
    let multi_agent_root = cli
        .multi_agent_root
        .clone()
        .or_else(|| config.multi_agent_root.clone())
        .unwrap_or_else(default_multi_agent_root);

    match cli.command.unwrap_or(Commands::Chat(ChatArgs::default())) {
        Commands::Chat(args) => {
            let ctx = ChatContext {
                config,
                multi_agent_root,
                ui: cli.ui,
                temperature: cli.temperature,
                max_tokens: cli.max_tokens,
                mcp_config: cli.mcp_config,
                skills_dir: cli.skills_dir,
            };
            modes::chat::run(args, ctx).await
        }
        Commands::Master(args) => {
            let config_path = Config::resolve_path(cli.config.as_deref())?;
            modes::master::run(args, config, config_path, multi_agent_root).await
        }
        Commands::Slave(args) => modes::slave::run(args, config, multi_agent_root).await,
        Commands::Worker(args) => modes::worker::run(args).await,
        Commands::Skills(args) => modes::skills::run(args).await,
    }
}

fn run_init(config_path: Option<&std::path::Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => config::config_dir()?.join("config.json"),
    };
    if path.exists() {
        println!("config already exists at {}", path.display());
        return Ok(());
    }
    let default = Config::default();
    let json = serde_json::to_vec_pretty(&default)?;
    mesh_storage::write_bytes_atomic(&path, &json, mesh_storage::FileMode::Private)?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

fn default_multi_agent_root() -> PathBuf {
    config::config_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("runs")
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
