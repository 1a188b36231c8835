// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunked file put/get, independent of the socket loop that carries the
//! envelopes: a [`ChunkSender`] turns bytes into a sequence of
//! `FilePutRequest` payloads, and a [`ChunkReceiver`] assembles them back
//! into a verified byte buffer a caller then commits atomically.

use base64::Engine;
use mesh_core::EnvelopeKind;
use mesh_storage::{write_bytes_atomic, FileMode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default chunk size for a single `FilePutRequest`/`FileGetResponse`.
pub const DEFAULT_CHUNK_BYTES: usize = 256 * 1024;

/// Joins `root` with a request-supplied relative path, rejecting anything
/// absolute or containing a `..` component so a remote peer can't read or
/// write outside the configured transfer root.
pub fn resolve_transfer_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let requested = Path::new(requested);
    if requested
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir | std::path::Component::Prefix(_)))
    {
        return None;
    }
    Some(root.join(requested))
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("chunk received out of order: expected offset {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },
    #[error("digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: String, computed: String },
    #[error("final chunk missing a digest")]
    MissingDigest,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// One outgoing chunk, ready to place into an `EnvelopeKind::FilePutRequest`.
pub struct OutgoingChunk {
    pub offset: u64,
    pub size: u64,
    pub end: bool,
    pub digest: Option<String>,
    pub data_b64: String,
}

/// Splits a byte buffer into chunks of [`DEFAULT_CHUNK_BYTES`] (or a custom
/// size), base64-encoding each and attaching a SHA-256 digest of the whole
/// buffer to the final chunk.
pub struct ChunkSender<'a> {
    data: &'a [u8],
    chunk_bytes: usize,
    cursor: usize,
    done: bool,
}

impl<'a> ChunkSender<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_chunk_size(data, DEFAULT_CHUNK_BYTES)
    }

    pub fn with_chunk_size(data: &'a [u8], chunk_bytes: usize) -> Self {
        Self {
            data,
            chunk_bytes: chunk_bytes.max(1),
            cursor: 0,
            done: false,
        }
    }

    /// Produce the next chunk, or `None` once the whole buffer (including a
    /// single empty chunk for zero-length input) has been sent.
    pub fn next_chunk(&mut self) -> Option<OutgoingChunk> {
        if self.done {
            return None;
        }
        let start = self.cursor;
        let end_off = (start + self.chunk_bytes).min(self.data.len());
        let slice = &self.data[start..end_off];
        let is_last = end_off >= self.data.len();
        self.cursor = end_off;
        self.done = is_last;

        Some(OutgoingChunk {
            offset: start as u64,
            size: slice.len() as u64,
            end: is_last,
            digest: if is_last { Some(sha256_hex(self.data)) } else { None },
            data_b64: base64::engine::general_purpose::STANDARD.encode(slice),
        })
    }
}

/// Assembles chunks received out of a `FilePutRequest` stream back into a
/// contiguous buffer, rejecting gaps/overlaps and verifying the digest
/// attached to the final chunk.
#[derive(Default)]
pub struct ChunkReceiver {
    buf: Vec<u8>,
}

impl ChunkReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk. Returns `Ok(Some(bytes))` once the final chunk has
    /// been received and its digest verified, `Ok(None)` for intermediate
    /// chunks.
    pub fn accept_chunk(
        &mut self,
        offset: u64,
        data_b64: &str,
        end: bool,
        digest: Option<&str>,
    ) -> Result<Option<Vec<u8>>, TransferError> {
        if offset != self.buf.len() as u64 {
            return Err(TransferError::OutOfOrder {
                expected: self.buf.len() as u64,
                got: offset,
            });
        }
        let bytes = base64::engine::general_purpose::STANDARD.decode(data_b64)?;
        self.buf.extend_from_slice(&bytes);

        if !end {
            return Ok(None);
        }

        let expected = digest.ok_or(TransferError::MissingDigest)?;
        let computed = sha256_hex(&self.buf);
        if computed != expected {
            return Err(TransferError::DigestMismatch {
                expected: expected.to_string(),
                computed,
            });
        }
        Ok(Some(std::mem::take(&mut self.buf)))
    }
}

fn rejected_put(reason: impl Into<String>) -> EnvelopeKind {
    EnvelopeKind::FilePutResponse { ok: false, reason: Some(reason.into()) }
}

fn rejected_get(reason: impl Into<String>) -> EnvelopeKind {
    EnvelopeKind::FileGetResponse {
        offset: 0,
        size: 0,
        end: true,
        digest: None,
        data: String::new(),
        ok: false,
        reason: Some(reason.into()),
    }
}

/// Responder-side handling of one inbound `FilePutRequest` chunk: resolves
/// `path` under `root`, feeds the chunk to `receivers`' entry for
/// `request_id`, and commits the assembled bytes atomically once the final
/// chunk verifies. Returns the `FilePutResponse` to send back to the peer.
pub fn handle_put_chunk(
    root: Option<&Path>,
    receivers: &mut HashMap<String, ChunkReceiver>,
    request_id: &str,
    path: &str,
    offset: u64,
    data: &str,
    end: bool,
    digest: Option<&str>,
) -> EnvelopeKind {
    let Some(root) = root else {
        return rejected_put("file transfer not enabled");
    };
    let Some(dest) = resolve_transfer_path(root, path) else {
        return rejected_put("path escapes transfer root");
    };

    let receiver = receivers.entry(request_id.to_string()).or_default();
    let outcome = receiver.accept_chunk(offset, data, end, digest);
    if !matches!(outcome, Ok(None)) {
        receivers.remove(request_id);
    }

    match outcome {
        Ok(Some(bytes)) => match write_bytes_atomic(&dest, &bytes, FileMode::Shared) {
            Ok(()) => EnvelopeKind::FilePutResponse { ok: true, reason: None },
            Err(e) => rejected_put(e.to_string()),
        },
        Ok(None) => EnvelopeKind::FilePutResponse { ok: true, reason: None },
        Err(e) => rejected_put(e.to_string()),
    }
}

/// Responder-side handling of one inbound `FileGetRequest`: resolves
/// `path` under `root`, reads the whole file, and returns the ordered
/// `FileGetResponse` chunks to send back (a single rejecting chunk if the
/// path is disallowed or the read fails).
pub fn handle_get_request(root: Option<&Path>, path: &str) -> Vec<EnvelopeKind> {
    let Some(root) = root else {
        return vec![rejected_get("file transfer not enabled")];
    };
    let Some(src) = resolve_transfer_path(root, path) else {
        return vec![rejected_get("path escapes transfer root")];
    };

    let data = match std::fs::read(&src) {
        Ok(bytes) => bytes,
        Err(e) => return vec![rejected_get(e.to_string())],
    };

    let mut sender = ChunkSender::new(&data);
    let mut frames = Vec::new();
    while let Some(chunk) = sender.next_chunk() {
        frames.push(EnvelopeKind::FileGetResponse {
            offset: chunk.offset,
            size: chunk.size,
            end: chunk.end,
            digest: chunk.digest,
            data: chunk.data_b64,
            ok: true,
            reason: None,
        });
    }
    frames
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
