// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SendSignal and WaitSignal: named rendezvous between agents in the same
//! run, backed by a run-level `signals.jsonl`.

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::paths;
use mesh_core::Signal;
use mesh_storage::{append_with_next_seq, read_jsonl_since};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Interval between successive `signals.jsonl` re-reads while a waiter is
/// parked in [`Coordinator::wait_signal`].
const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl Coordinator {
    pub fn send_signal(
        &self,
        run_id: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<Signal, CoordinatorError> {
        let path = paths::signals_jsonl(&self.root, run_id);
        let at_ms = self.clock.now_ms();
        let signal = append_with_next_seq(
            &path,
            |s: &Signal| s.seq,
            |seq| Signal::new(name, seq, at_ms, payload),
        )?;
        Ok(signal)
    }

    /// Waits for the first signal named `name` whose seq exceeds
    /// `since_seq`, polling `signals.jsonl` until one arrives, `timeout`
    /// elapses, or `cancel` fires.
    pub async fn wait_signal(
        &self,
        run_id: &str,
        name: &str,
        since_seq: u64,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Signal, CoordinatorError> {
        let path = paths::signals_jsonl(&self.root, run_id);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let candidates: Vec<Signal> = read_jsonl_since(&path, since_seq, |s| s.seq)?;
            if let Some(hit) = candidates
                .into_iter()
                .filter(|s| s.matches(name, since_seq))
                .min_by_key(|s| s.seq)
            {
                return Ok(hit);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(CoordinatorError::SignalTimeout {
                    name: name.to_string(),
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(SIGNAL_POLL_INTERVAL) => {}
                _ = cancel.cancelled() => {
                    return Err(CoordinatorError::SignalTimeout {
                        name: name.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "signal_ops_tests.rs"]
mod tests;
