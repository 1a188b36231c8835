// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HMAC-SHA256 signing and verification of `register` envelopes, plus a
//! nonce replay cache and timestamp skew check.
//!
//! The signed payload is the canonical concatenation of the fields that
//! matter for authenticity (slave id, display name, version, nonce,
//! timestamp), joined with `|`. The signature never covers `capabilities`
//! or `metadata` since those are free-form and not security-relevant.

use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between a slave's claimed timestamp and the
/// master's own clock, in either direction.
pub const MAX_TIMESTAMP_SKEW_SECS: u64 = 60;

/// Window within which a nonce is remembered and rejected as a replay,
/// twice the timestamp skew tolerance.
pub const NONCE_REPLAY_WINDOW_SECS: u64 = 2 * MAX_TIMESTAMP_SKEW_SECS;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid secret key")]
    InvalidKey,
    #[error("signature does not match")]
    BadSignature,
    #[error("timestamp {timestamp} outside allowed skew of now={now}")]
    TimestampSkew { timestamp: u64, now: u64 },
    #[error("nonce already used")]
    NonceReplayed,
}

fn canonical_payload(
    slave_id: &str,
    display_name: &str,
    version: &str,
    nonce: &str,
    timestamp: u64,
) -> String {
    format!("{slave_id}|{display_name}|{version}|{nonce}|{timestamp}")
}

/// Sign a registration payload with the shared secret, returning the
/// signature base64-encoded for wire transport.
pub fn sign_register(
    secret: &[u8],
    slave_id: &str,
    display_name: &str,
    version: &str,
    nonce: &str,
    timestamp: u64,
) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidKey)?;
    mac.update(canonical_payload(slave_id, display_name, version, nonce, timestamp).as_bytes());
    let tag = mac.finalize().into_bytes();
    Ok(base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        tag,
    ))
}

/// Verify a registration signature in constant time, and reject stale
/// timestamps before touching the nonce cache.
#[allow(clippy::too_many_arguments)]
pub fn verify_register(
    secret: &[u8],
    slave_id: &str,
    display_name: &str,
    version: &str,
    nonce: &str,
    timestamp: u64,
    signature_b64: &str,
    now: u64,
) -> Result<(), AuthError> {
    let skew = now.abs_diff(timestamp);
    if skew > MAX_TIMESTAMP_SKEW_SECS {
        return Err(AuthError::TimestampSkew { timestamp, now });
    }

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidKey)?;
    mac.update(canonical_payload(slave_id, display_name, version, nonce, timestamp).as_bytes());

    let signature = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, signature_b64)
        .map_err(|_| AuthError::BadSignature)?;

    mac.verify_slice(&signature).map_err(|_| AuthError::BadSignature)
}

/// Bounded replay cache: remembers nonces seen within
/// [`NONCE_REPLAY_WINDOW_SECS`] and evicts older entries on each check, so
/// memory use stays proportional to the registration rate over that window
/// rather than growing without bound.
#[derive(Default)]
pub struct NonceCache {
    seen: Mutex<HashMap<String, u64>>,
}

impl NonceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `nonce` as used at `now`, rejecting it if already present.
    /// Must be called only after [`verify_register`] succeeds, since a
    /// forged registration should not consume a legitimate nonce slot.
    pub fn check_and_insert(&self, nonce: &str, now: u64) -> Result<(), AuthError> {
        let mut seen = self.seen.lock();
        seen.retain(|_, &mut seen_at| now.saturating_sub(seen_at) <= NONCE_REPLAY_WINDOW_SECS);
        if seen.contains_key(nonce) {
            return Err(AuthError::NonceReplayed);
        }
        seen.insert(nonce.to_string(), now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
