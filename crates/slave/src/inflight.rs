// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-flight gate for inbound `agent.run` frames: a semaphore that
//! refuses to block, so a full slave can reply `busy` immediately rather
//! than queuing the request.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct InflightGate {
    semaphore: Arc<Semaphore>,
}

impl InflightGate {
    pub fn new(max_inflight: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_inflight)),
        }
    }

    /// Acquire a slot without waiting. `None` means the gate is at
    /// capacity and the caller should reply `busy`.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.semaphore.clone().try_acquire_owned().ok()
    }
}

#[cfg(test)]
#[path = "inflight_tests.rs"]
mod tests;
