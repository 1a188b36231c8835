// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker controller's error seam.

use mesh_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("coordinator error: {0}")]
    Coordinator(#[from] mesh_coordinator::CoordinatorError),

    #[error("model client error: {0}")]
    Llm(#[from] crate::llm::LlmError),
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::Coordinator(e) => e.kind(),
            WorkerError::Llm(_) => ErrorKind::RemoteError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
