// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator error seam: rich, specific variants that map onto
//! [`mesh_core::ErrorKind`] at the boundary with callers outside this
//! crate (the slave's built-in handler, the worker controller, the CLI).

use mesh_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("run {0} not found")]
    RunNotFound(String),

    #[error("agent {0} not found")]
    AgentNotFound(String),

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("id generation exhausted {attempts} attempts")]
    IdExhausted { attempts: u32 },

    #[error("invalid state transition for agent {agent_id}: {from} -> {to}")]
    InvalidTransition {
        agent_id: String,
        from: String,
        to: String,
    },

    #[error("signal wait for {name} timed out")]
    SignalTimeout { name: String },

    #[error("storage error: {0}")]
    Storage(#[from] mesh_storage::StorageError),

    #[error("jsonl error: {0}")]
    Jsonl(#[from] mesh_storage::JsonlError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::RunNotFound(_) | CoordinatorError::AgentNotFound(_) => {
                ErrorKind::ProtocolError
            }
            CoordinatorError::AlreadyExists { .. } => ErrorKind::ProtocolError,
            CoordinatorError::IdExhausted { .. } => ErrorKind::IoError,
            CoordinatorError::InvalidTransition { .. } => ErrorKind::ProtocolError,
            CoordinatorError::SignalTimeout { .. } => ErrorKind::Timeout,
            CoordinatorError::Storage(_) | CoordinatorError::Jsonl(_) | CoordinatorError::Io(_) => {
                ErrorKind::IoError
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
