// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SHA-256 digesting for the remote file transfer codec: the sender
//! includes a digest on the final chunk, the receiver verifies it against
//! bytes actually written before committing the temp file.

use sha2::{Digest, Sha256};

/// A SHA-256 digest, rendered lowercase-hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize().as_slice()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convenience wrapper returning the hex digest directly.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256Digest::of_bytes(data).0
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;
