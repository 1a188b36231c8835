// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-supplied configuration: model provider credentials (opaque),
//! the cluster section (secret, TLS, heartbeat/inflight knobs), file
//! transfer caps, per-mode start-param overrides, and the assistant's
//! opaque reply-style/compaction blobs. Loaded from a JSON file at a
//! caller-supplied path, defaulting to the per-user config directory;
//! absent is not an error, since a master's secret auto-generates on
//! first boot and every other field has a usable default.

use mesh_storage::{write_bytes_atomic, FileMode, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no home or config directory found for this user")]
    NoConfigDir,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider credentials, passed through untouched -- provider
    /// integration is not interpreted by the control plane.
    pub model: serde_json::Value,
    pub cluster: ClusterConfig,
    pub files: FilesConfig,
    pub multi_agent_root: Option<PathBuf>,
    pub start_params: StartParams,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Base64-encoded 32-byte HMAC secret. Left unset, the master
    /// auto-generates and persists one on first boot.
    pub secret: Option<String>,
    pub tls: TlsConfig,
    pub heartbeat_interval_secs: Option<u64>,
    pub max_inflight_runs: Option<usize>,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub max_frame_bytes: Option<usize>,
    pub transfer_chunk_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartParams {
    pub master: MasterStartParams,
    pub slave: SlaveStartParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterStartParams {
    pub listen: Option<String>,
    pub ws_path: Option<String>,
    pub redis_url: Option<String>,
    pub heartbeat_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaveStartParams {
    pub master: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub heartbeat_interval_secs: Option<u64>,
    pub max_inflight_runs: Option<usize>,
    pub insecure_skip_verify: Option<bool>,
}

/// Opaque blobs the control plane stores but never interprets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub reply_style: serde_json::Value,
    pub auto_compaction: serde_json::Value,
}

impl Config {
    /// The path [`Self::load`] would read from for a given caller-supplied
    /// override, so callers that later need to rewrite the config (e.g.
    /// persisting an auto-generated cluster secret) can target the same
    /// file without duplicating the resolution rule.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => default_config_path(),
        }
    }

    /// Load from `path`, or from the per-user config directory if `path`
    /// is `None`. A missing file at the default location is not an
    /// error -- it yields [`Config::default`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = Self::resolve_path(path)?;

        match std::fs::read_to_string(&resolved) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: resolved.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && path.is_none() => {
                Ok(Config::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: resolved.display().to_string(),
                source,
            }),
        }
    }

    /// Serialize and atomically persist this config to `path`, mode 0600
    /// since `cluster.secret` may live in it.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_vec_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        write_bytes_atomic(path, &contents, FileMode::Private)?;
        Ok(())
    }
}

/// `$MESH_CONFIG_DIR` takes priority (used by tests for isolation), then
/// the platform config directory, then `~/.config`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("MESH_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|d| d.join("mesh"))
        .ok_or(ConfigError::NoConfigDir)
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the stable slave id from the per-user config directory,
/// generating and persisting one on first use.
pub fn load_or_generate_stable_slave_id() -> Result<String, ConfigError> {
    let path = config_dir()?.join("slave-id");
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let id = mesh_core::short_token("slave");
    write_bytes_atomic(&path, id.as_bytes(), FileMode::Private)?;
    Ok(id)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
