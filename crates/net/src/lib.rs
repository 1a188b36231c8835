// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mesh-net: transport-level plumbing shared by the master gateway and the
//! slave client -- envelope framing over a websocket, HMAC registration
//! signing with replay protection, the presence-store abstraction, TLS
//! setup, and chunked file transfer.

pub mod auth;
pub mod presence;
pub mod tls;
pub mod transfer;
pub mod wire;

pub use auth::{sign_register, verify_register, AuthError, NonceCache, MAX_TIMESTAMP_SKEW_SECS};
pub use presence::{NoopPresenceStore, PresenceError, PresenceStore, RedisPresenceStore};
pub use tls::{client_tls_config, TlsError};
pub use transfer::{
    handle_get_request, handle_put_chunk, resolve_transfer_path, ChunkReceiver, ChunkSender,
    OutgoingChunk, TransferError, DEFAULT_CHUNK_BYTES,
};
pub use wire::{read_envelope, write_envelope, WireError};
