// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so heartbeat/TTL/replay-window logic is deterministically
//! testable.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the "now" used by timestamps, TTLs, and skew checks.
pub trait Clock: Send + Sync {
    /// Current time as seconds since the Unix epoch.
    fn now_secs(&self) -> u64;

    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64 {
        self.now_secs() * 1000
    }
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }

    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

/// Deterministic clock for tests. Starts at an arbitrary fixed instant and
/// only advances when told to.
#[derive(Clone)]
pub struct FakeClock {
    secs: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Arc::new(Mutex::new(start_secs)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.secs.lock() += by.as_secs();
    }

    pub fn set(&self, secs: u64) {
        *self.secs.lock() = secs;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for FakeClock {
    fn now_secs(&self) -> u64 {
        *self.secs.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
