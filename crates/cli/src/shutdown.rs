// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared signal handling for the long-running `master`/`slave` modes:
//! SIGTERM/SIGINT ask for a plain shutdown, SIGHUP additionally requests
//! a restart via the [`RestartManager`] sentinel before shutting down.

use mesh_core::{Clock, RestartKind, SystemClock};
use mesh_storage::RestartManager;
use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// The single restart sentinel both `master` and `slave` share: a sibling
/// of the multi-agent root rather than inside it, so restarting doesn't
/// interact with the run tree's own files.
pub fn restart_sentinel_path(multi_agent_root: &Path) -> PathBuf {
    multi_agent_root
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("restart-sentinel.json")
}

/// Waits for SIGTERM, SIGINT, or SIGHUP. On SIGHUP, records a restart
/// request against `restart` before returning, so the caller can check
/// [`RestartManager::is_restart_requested`] once its server loop exits.
pub async fn wait_for_shutdown_or_restart(restart: &RestartManager, kind: RestartKind) {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            std::future::pending().await
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGINT handler");
            std::future::pending().await
        }
    };
    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGHUP handler");
            std::future::pending().await
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
        _ = sighup.recv() => {
            info!("received SIGHUP, requesting restart");
            let now_ms = SystemClock.now_ms();
            if let Err(e) = restart.request_restart(kind, now_ms, std::process::id(), "SIGHUP") {
                tracing::warn!(error = %e, "failed to persist restart sentinel");
            }
        }
    }
}

/// After the server loop has exited, act on a pending restart request:
/// exit with the supervisor's restart code if a supervisor owns
/// respawning, otherwise re-execute this binary in place so the
/// controlling terminal's foreground process group is preserved.
pub fn handle_restart_if_requested(restart: &RestartManager) -> ! {
    let _ = restart.consume_sentinel();

    let disabled = std::env::var_os(mesh_core::ENV_SUPERVISOR_DISABLE).is_some();
    let under_supervisor = std::env::var_os(mesh_core::ENV_SUPERVISOR_CHILD).is_some();

    if under_supervisor && !disabled {
        std::process::exit(mesh_core::SUPERVISOR_RESTART_EXIT_CODE);
    }

    let exe = std::env::current_exe().unwrap_or_else(|_| "mesh".into());
    let args: Vec<std::ffi::OsString> = std::env::args_os().skip(1).collect();

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = std::process::Command::new(&exe).args(&args).exec();
        tracing::error!(error = %err, "failed to re-exec for restart");
        std::process::exit(1);
    }

    #[cfg(not(unix))]
    {
        let status = std::process::Command::new(&exe).args(&args).status();
        std::process::exit(status.map(|s| s.code().unwrap_or(1)).unwrap_or(1));
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
