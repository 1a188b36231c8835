// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnection backoff: exponential with full jitter, capped, resetting
//! once a connection has proven itself stable.

use std::time::Duration;

const INITIAL: Duration = Duration::from_secs(1);
const CAP: Duration = Duration::from_secs(30);

/// Minimum time a connection must stay `LIVE` before [`Backoff::note_live_for`]
/// resets the attempt counter back to zero.
pub const STABLE_AFTER: Duration = Duration::from_secs(60);

/// Exponential-backoff-with-full-jitter delay generator for the slave's
/// reconnect loop. Not `Clone` -- one instance tracks one connection's
/// attempt history.
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub fn new() -> Self {
        Self { attempt: 0 }
    }

    /// Delay before the next dial attempt, uniformly sampled between zero
    /// and `min(CAP, INITIAL * 2^attempt)`. Advances the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = INITIAL.saturating_mul(1 << self.attempt.min(16));
        let bound = exp.min(CAP);
        self.attempt = self.attempt.saturating_add(1);

        if bound.is_zero() {
            return bound;
        }
        let millis = rand::Rng::random_range(&mut rand::rng(), 0..=bound.as_millis() as u64);
        Duration::from_millis(millis)
    }

    /// Reset the attempt counter after a connection stayed `LIVE` for at
    /// least [`STABLE_AFTER`].
    pub fn note_live_for(&mut self, live_duration: Duration) {
        if live_duration >= STABLE_AFTER {
            self.attempt = 0;
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
