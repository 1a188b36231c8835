// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mesh master`: runs the control-plane gateway in the foreground until
//! asked to stop or restart.

use crate::config::Config;
use crate::shutdown::{self, restart_sentinel_path};
use anyhow::{bail, Context, Result};
use base64::Engine;
use mesh_core::{RestartKind, SystemClock};
use mesh_master::{build_router, GatewaySecret, MasterGateway, MasterGatewayConfig};
use mesh_net::{NoopPresenceStore, PresenceStore, RedisPresenceStore};
use mesh_storage::RestartManager;
use rand::RngCore;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CLUSTER_SECRET_LEN: usize = 32;

const DEFAULT_LISTEN: &str = "127.0.0.1:7447";
const DEFAULT_WS_PATH: &str = "/ws";

#[derive(clap::Args, Debug, Clone, Default)]
pub struct MasterArgs {
    /// Address to listen on, e.g. 0.0.0.0:7447
    #[arg(long)]
    pub listen: Option<String>,
    /// Websocket path slaves connect to
    #[arg(long)]
    pub ws_path: Option<String>,
    /// Redis URL for presence sharing across multiple master instances
    #[arg(long)]
    pub redis_url: Option<String>,
    /// Heartbeat interval sent to registered slaves, in seconds
    #[arg(long)]
    pub heartbeat: Option<u64>,
}

/// Flags win over `start_params.master`, which wins over the shared
/// `cluster` section (for the fields it also carries), which wins over a
/// hardcoded default.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedParams {
    listen: String,
    ws_path: String,
    redis_url: Option<String>,
    heartbeat_interval_secs: u64,
}

fn resolve(args: &MasterArgs, config: &Config) -> ResolvedParams {
    ResolvedParams {
        listen: args
            .listen
            .clone()
            .or_else(|| config.start_params.master.listen.clone())
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
        ws_path: args
            .ws_path
            .clone()
            .or_else(|| config.start_params.master.ws_path.clone())
            .unwrap_or_else(|| DEFAULT_WS_PATH.to_string()),
        redis_url: args
            .redis_url
            .clone()
            .or_else(|| config.start_params.master.redis_url.clone())
            .or_else(|| config.cluster.redis_url.clone()),
        heartbeat_interval_secs: args
            .heartbeat
            .or(config.start_params.master.heartbeat_interval_secs)
            .or(config.cluster.heartbeat_interval_secs)
            .unwrap_or(20),
    }
}

/// Load the HMAC secret from `config.cluster.secret`, or generate one and
/// atomically rewrite the config file with it (mode 0600) if absent --
/// so a second boot, and every slave, reuses the same secret read back
/// from the same config.
fn load_or_generate_cluster_secret(config: &mut Config, config_path: &Path) -> Result<GatewaySecret> {
    if let Some(b64) = &config.cluster.secret {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .context("cluster.secret is not valid base64")?;
        if bytes.is_empty() {
            bail!("cluster.secret decoded to zero bytes");
        }
        return Ok(GatewaySecret::new(bytes));
    }

    let mut bytes = vec![0u8; CLUSTER_SECRET_LEN];
    rand::rng().fill_bytes(&mut bytes);
    config.cluster.secret = Some(base64::engine::general_purpose::STANDARD.encode(&bytes));
    config
        .save(config_path)
        .context("persisting auto-generated cluster secret")?;
    Ok(GatewaySecret::new(bytes))
}

pub async fn run(args: MasterArgs, mut config: Config, config_path: PathBuf, multi_agent_root: PathBuf) -> Result<()> {
    let ResolvedParams { listen, ws_path, redis_url, heartbeat_interval_secs } = resolve(&args, &config);

    let secret = load_or_generate_cluster_secret(&mut config, &config_path)?;

    let presence: Arc<dyn PresenceStore> = match &redis_url {
        Some(url) => Arc::new(
            RedisPresenceStore::connect(url)
                .await
                .context("connecting to redis presence store")?,
        ),
        None => Arc::new(NoopPresenceStore),
    };

    let gateway = MasterGateway::with_presence(
        secret,
        Arc::new(SystemClock),
        presence,
        MasterGatewayConfig {
            heartbeat_interval_secs,
            file_root: Some(multi_agent_root.join("transfer")),
            ..Default::default()
        },
    );

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid --listen address '{listen}'"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!(%addr, %ws_path, "master listening");

    let router = build_router(gateway, &ws_path);
    let restart = RestartManager::new(restart_sentinel_path(&multi_agent_root));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait_for_shutdown_or_restart(&restart, RestartKind::Master))
        .await
        .context("master server loop")?;

    if restart.is_restart_requested() {
        shutdown::handle_restart_if_requested(&restart);
    }
    Ok(())
}

#[cfg(test)]
#[path = "master_tests.rs"]
mod tests;
