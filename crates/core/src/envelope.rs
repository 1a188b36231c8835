// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The envelope: the single framed message type on the control channel.
//! The set of recognised kinds is fixed and extended only with a protocol
//! version bump -- a typed discriminated union, not a dynamic payload map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current protocol version. Bumped when the `EnvelopeKind` set changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default maximum serialised envelope size.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Typed payload carried by an envelope. Unknown required fields are
/// rejected by `serde`'s default (non-`deny_unknown_fields`... but every
/// variant here lists its fields explicitly); unknown *optional* fields are
/// ignored because we never `deny_unknown_fields` on the envelope itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Client -> server: authenticate a new connection.
    Register {
        slave_id: String,
        display_name: String,
        version: String,
        capabilities: Vec<String>,
        metadata: serde_json::Value,
        nonce: String,
        timestamp: u64,
        signature: String,
    },
    /// Server -> client: accept or reject a `Register`.
    RegisterAck {
        accepted: bool,
        reason: Option<String>,
        heartbeat_interval_secs: Option<u64>,
        server_instance_id: Option<String>,
    },
    /// Either direction: liveness ping.
    Heartbeat,
    /// Either direction: liveness pong.
    HeartbeatAck,
    /// Master -> slave: run a task.
    AgentRun {
        task: String,
        options: serde_json::Value,
        metadata: serde_json::Value,
    },
    /// Slave -> master: terminal result for an `AgentRun`.
    AgentResult {
        status: String,
        output: Option<String>,
        run_id: Option<String>,
        error: Option<String>,
    },
    /// Slave -> master: intermediate streamed event for an in-flight run.
    AgentEvent { event: serde_json::Value },
    /// Master -> slave: request cancellation of an in-flight run.
    AgentCancel,
    /// Either direction: begin a chunked file upload.
    FilePutRequest {
        path: String,
        offset: u64,
        size: u64,
        end: bool,
        digest: Option<String>,
        data: String, // base64-encoded chunk
    },
    FilePutResponse { ok: bool, reason: Option<String> },
    FileGetRequest { path: String },
    FileGetResponse {
        offset: u64,
        size: u64,
        end: bool,
        digest: Option<String>,
        data: String,
        ok: bool,
        reason: Option<String>,
    },
    /// Either direction: something went wrong processing this request id.
    Error { kind: crate::ErrorKind, message: String },
}

impl EnvelopeKind {
    /// Whether frames of this kind may stream multiple times for a single
    /// request id before the terminal reply.
    pub fn is_streamable(&self) -> bool {
        matches!(self, EnvelopeKind::AgentEvent { .. })
    }

    /// The wire tag used in logs/metrics (does not leak payload content).
    pub fn tag(&self) -> &'static str {
        match self {
            EnvelopeKind::Register { .. } => "register",
            EnvelopeKind::RegisterAck { .. } => "register_ack",
            EnvelopeKind::Heartbeat => "heartbeat",
            EnvelopeKind::HeartbeatAck => "heartbeat_ack",
            EnvelopeKind::AgentRun { .. } => "agent.run",
            EnvelopeKind::AgentResult { .. } => "agent.result",
            EnvelopeKind::AgentEvent { .. } => "agent.event",
            EnvelopeKind::AgentCancel => "agent.cancel",
            EnvelopeKind::FilePutRequest { .. } => "file.put.request",
            EnvelopeKind::FilePutResponse { .. } => "file.put.response",
            EnvelopeKind::FileGetRequest { .. } => "file.get.request",
            EnvelopeKind::FileGetResponse { .. } => "file.get.response",
            EnvelopeKind::Error { .. } => "error",
        }
    }
}

/// A single framed message on the control channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Client-chosen request id, opaque, unique per in-flight request.
    pub request_id: String,
    /// Monotonically-sourced timestamp, seconds.
    pub timestamp: u64,
    /// Protocol version.
    pub version: u32,
    /// The discriminated payload.
    pub kind: EnvelopeKind,
}

impl Envelope {
    pub fn new(request_id: impl Into<String>, timestamp: u64, kind: EnvelopeKind) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp,
            version: PROTOCOL_VERSION,
            kind,
        }
    }

    /// Encode to JSON bytes, rejecting frames that exceed `max_bytes`.
    pub fn encode(&self, max_bytes: usize) -> Result<Vec<u8>, EnvelopeError> {
        let bytes = serde_json::to_vec(self)?;
        if bytes.len() > max_bytes {
            return Err(EnvelopeError::TooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        Ok(bytes)
    }

    /// Decode from JSON bytes, rejecting frames that exceed `max_bytes`
    /// before attempting to parse (so an attacker-controlled oversize frame
    /// never reaches the JSON parser).
    pub fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self, EnvelopeError> {
        if bytes.len() > max_bytes {
            return Err(EnvelopeError::TooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build an `error` envelope that echoes this envelope's request id.
    pub fn error_reply(&self, kind: crate::ErrorKind, message: impl Into<String>, now: u64) -> Self {
        Envelope::new(
            self.request_id.clone(),
            now,
            EnvelopeKind::Error {
                kind,
                message: message.into(),
            },
        )
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
