// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mesh slave`: dials a configured master and services inbound
//! `agent.run` requests by delegating to the multi-agent coordinator.

use crate::config::{load_or_generate_stable_slave_id, Config};
use crate::shutdown::{self, restart_sentinel_path};
use anyhow::{bail, Context, Result};
use base64::Engine;
use mesh_core::{RestartKind, SlaveMetadata, SystemClock};
use mesh_coordinator::{Coordinator, CoordinatorPolicy, PrunePolicy, WorkerExecInfo};
use mesh_slave::{CoordinatorHandler, SlaveClient, SlaveClientConfig};
use mesh_storage::RestartManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often the auto-cleanup runner sweeps the run tree for expired or
/// excess runs.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// Default retention for completed runs, absent any future operator
/// knob to override it.
const DEFAULT_PRUNE_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 3600);

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SlaveArgs {
    /// Master URL to connect to, e.g. ws://host:7447/ws
    #[arg(long)]
    pub master: String,
    /// Stable slave id; generated once and persisted if omitted
    #[arg(long)]
    pub id: Option<String>,
    /// Display name shown in the master's registry
    #[arg(long)]
    pub name: Option<String>,
    /// User tags, repeatable as --tags key=value
    #[arg(long = "tags", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,
    /// Heartbeat interval requested of this connection, in seconds.
    /// The master's register_ack ultimately governs the live cadence.
    #[arg(long)]
    pub heartbeat: Option<u64>,
    #[arg(long)]
    pub max_inflight_runs: Option<usize>,
    #[arg(long)]
    pub insecure_skip_verify: bool,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// Everything resolvable without touching the filesystem or network:
/// flag > `start_params.slave` > shared `cluster` section (where one
/// exists) > a hardcoded default. `slave_id` is the one exception --
/// its fallback touches disk, so it is left `None` here for the caller
/// to fill in with [`load_or_generate_stable_slave_id`].
#[derive(Debug, Clone, PartialEq)]
struct ResolvedIdentity {
    slave_id: Option<String>,
    display_name_override: Option<String>,
    max_inflight: usize,
    insecure_skip_verify: bool,
}

fn resolve_identity(args: &SlaveArgs, config: &Config) -> ResolvedIdentity {
    ResolvedIdentity {
        slave_id: args.id.clone().or_else(|| config.start_params.slave.id.clone()),
        display_name_override: args.name.clone().or_else(|| config.start_params.slave.name.clone()),
        max_inflight: args
            .max_inflight_runs
            .or(config.start_params.slave.max_inflight_runs)
            .or(config.cluster.max_inflight_runs)
            .unwrap_or(1),
        insecure_skip_verify: args.insecure_skip_verify
            || config.start_params.slave.insecure_skip_verify.unwrap_or(false)
            || config.cluster.tls.insecure_skip_verify,
    }
}

pub async fn run(args: SlaveArgs, config: Config, multi_agent_root: std::path::PathBuf) -> Result<()> {
    let secret_b64 = config
        .cluster
        .secret
        .clone()
        .context("cluster.secret is required to register with a master; set it in the config file")?;
    let secret = base64::engine::general_purpose::STANDARD
        .decode(secret_b64)
        .context("cluster.secret is not valid base64")?;
    if secret.is_empty() {
        bail!("cluster.secret decoded to zero bytes");
    }

    let identity = resolve_identity(&args, &config);
    let slave_id = match identity.slave_id {
        Some(id) => id,
        None => load_or_generate_stable_slave_id().context("loading stable slave id")?,
    };
    let display_name = identity
        .display_name_override
        .unwrap_or_else(|| hostname_fallback().unwrap_or_else(|| "mesh-slave".to_string()));
    let max_inflight = identity.max_inflight;
    let insecure_skip_verify = identity.insecure_skip_verify;

    let mut tags = HashMap::new();
    for (k, v) in &args.tags {
        tags.insert(k.clone(), v.clone());
    }
    let metadata = SlaveMetadata {
        os: Some(std::env::consts::OS.to_string()),
        arch: Some(std::env::consts::ARCH.to_string()),
        hostname: hostname_fallback(),
        tags,
    };

    if insecure_skip_verify {
        tracing::warn!(slave_id = %slave_id, "TLS certificate verification is DISABLED for this connection");
    }

    std::fs::create_dir_all(&multi_agent_root).context("creating multi-agent root")?;
    let coordinator = Coordinator::new(multi_agent_root.clone(), Arc::new(SystemClock), CoordinatorPolicy::default());
    let prune_coordinator = coordinator.clone();
    let handler = CoordinatorHandler::new(coordinator, WorkerExecInfo::default());

    let client_config = SlaveClientConfig {
        master_url: args.master.clone(),
        slave_id: slave_id.clone(),
        display_name,
        metadata,
        secret,
        insecure_skip_verify,
        max_inflight,
        file_root: Some(multi_agent_root.join("transfer")),
        ..Default::default()
    };

    let client = SlaveClient::new(client_config, handler, Arc::new(SystemClock));
    let stop = CancellationToken::new();

    let prune_stop = CancellationToken::new();
    let prune_task = tokio::spawn(run_prune_loop(prune_coordinator, prune_stop.clone()));

    let restart = RestartManager::new(restart_sentinel_path(&multi_agent_root));
    let restart_signal = stop.clone();
    let restart_ref = &restart;
    let signal_wait = async {
        shutdown::wait_for_shutdown_or_restart(restart_ref, RestartKind::Slave).await;
        restart_signal.cancel();
    };

    tokio::select! {
        result = client.run(stop) => result.context("slave client loop")?,
        _ = signal_wait => {}
    }

    prune_stop.cancel();
    let _ = prune_task.await;

    if restart.is_restart_requested() {
        shutdown::handle_restart_if_requested(&restart);
    }
    Ok(())
}

/// The auto-cleanup runner: periodically sweeps the run tree for runs
/// older than [`DEFAULT_PRUNE_MAX_AGE`], subject to the coordinator's
/// `prune_min_keep` floor, until asked to stop.
async fn run_prune_loop(coordinator: Coordinator, stop: CancellationToken) {
    let policy = PrunePolicy {
        max_age_ms: Some(DEFAULT_PRUNE_MAX_AGE.as_millis() as u64),
        max_count: None,
    };
    let mut interval = tokio::time::interval(PRUNE_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = interval.tick() => {
                match coordinator.prune(&policy) {
                    Ok(deleted) if !deleted.is_empty() => {
                        tracing::info!(count = deleted.len(), "pruned stale runs");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "run pruning failed"),
                }
            }
        }
    }
}

fn hostname_fallback() -> Option<String> {
    std::env::var("HOSTNAME").ok().or_else(|| {
        hostname_from_uname()
    })
}

#[cfg(unix)]
fn hostname_from_uname() -> Option<String> {
    let output = std::process::Command::new("hostname").output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

#[cfg(not(unix))]
fn hostname_from_uname() -> Option<String> {
    None
}

#[cfg(test)]
#[path = "slave_tests.rs"]
mod tests;
