// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gateway's HMAC shared secret: generated once on first boot and
//! persisted with owner-only permissions, then reused by every subsequent
//! start so existing slaves don't need to re-pair.

use mesh_storage::{write_bytes_atomic, FileMode, StorageError};
use rand::RngCore;
use std::path::Path;
use thiserror::Error;

const SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read existing secret: {0}")]
    Read(#[from] std::io::Error),
    #[error("existing secret file is empty")]
    Empty,
    #[error("failed to write secret: {0}")]
    Write(#[from] StorageError),
}

/// The gateway's HMAC signing key.
#[derive(Clone)]
pub struct GatewaySecret(Vec<u8>);

impl GatewaySecret {
    /// Wrap already-sourced secret bytes, e.g. decoded from the operator
    /// config's `cluster.secret` field.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Load the secret from `path`, generating and atomically persisting a
    /// fresh random one if the file does not yet exist.
    pub fn load_or_generate(path: &Path) -> Result<Self, SecretError> {
        if path.exists() {
            let bytes = std::fs::read(path)?;
            if bytes.is_empty() {
                return Err(SecretError::Empty);
            }
            return Ok(Self(bytes));
        }

        let mut bytes = vec![0u8; SECRET_LEN];
        rand::rng().fill_bytes(&mut bytes);
        write_bytes_atomic(path, &bytes, FileMode::Private)?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;
