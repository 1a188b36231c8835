use super::{handle_get_request, handle_put_chunk, resolve_transfer_path, ChunkReceiver, ChunkSender, TransferError};
use mesh_core::EnvelopeKind;
use std::collections::HashMap;
use std::path::Path;

#[test]
fn round_trips_small_payload_in_one_chunk() {
    let data = b"hello mesh".to_vec();
    let mut sender = ChunkSender::new(&data);
    let mut receiver = ChunkReceiver::new();

    let chunk = sender.next_chunk().expect("one chunk");
    assert!(chunk.end);
    let result = receiver
        .accept_chunk(chunk.offset, &chunk.data_b64, chunk.end, chunk.digest.as_deref())
        .expect("accept");
    assert_eq!(result, Some(data));
    assert!(sender.next_chunk().is_none());
}

#[test]
fn round_trips_multi_chunk_payload() {
    let data: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    let mut sender = ChunkSender::with_chunk_size(&data, 333);
    let mut receiver = ChunkReceiver::new();

    let mut assembled = None;
    while let Some(chunk) = sender.next_chunk() {
        let result = receiver
            .accept_chunk(chunk.offset, &chunk.data_b64, chunk.end, chunk.digest.as_deref())
            .expect("accept");
        if let Some(bytes) = result {
            assembled = Some(bytes);
        }
    }

    assert_eq!(assembled, Some(data));
}

#[test]
fn empty_payload_sends_one_empty_chunk() {
    let data: Vec<u8> = Vec::new();
    let mut sender = ChunkSender::new(&data);
    let chunk = sender.next_chunk().expect("one chunk even for empty input");
    assert_eq!(chunk.size, 0);
    assert!(chunk.end);
    assert!(sender.next_chunk().is_none());
}

#[test]
fn out_of_order_chunk_is_rejected() {
    let mut receiver = ChunkReceiver::new();
    let result = receiver.accept_chunk(10, "", false, None);
    assert!(matches!(result, Err(TransferError::OutOfOrder { expected: 0, got: 10 })));
}

#[test]
fn final_chunk_without_digest_is_rejected() {
    let mut receiver = ChunkReceiver::new();
    let result = receiver.accept_chunk(0, "aGk=", true, None);
    assert!(matches!(result, Err(TransferError::MissingDigest)));
}

#[test]
fn resolve_transfer_path_joins_relative_paths_under_root() {
    let root = Path::new("/var/mesh/transfer");
    assert_eq!(
        resolve_transfer_path(root, "agent-1/notes.txt"),
        Some(root.join("agent-1/notes.txt")),
    );
}

#[test]
fn resolve_transfer_path_rejects_escapes() {
    let root = Path::new("/var/mesh/transfer");
    assert!(resolve_transfer_path(root, "../../etc/passwd").is_none());
    assert!(resolve_transfer_path(root, "/etc/passwd").is_none());
}

#[test]
fn handle_put_chunk_commits_file_once_final_chunk_verifies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sender = ChunkSender::new(b"put me");
    let mut receivers: HashMap<String, ChunkReceiver> = HashMap::new();

    let chunk = sender.next_chunk().expect("one chunk");
    let reply = handle_put_chunk(
        Some(dir.path()),
        &mut receivers,
        "req-1",
        "notes/a.txt",
        chunk.offset,
        &chunk.data_b64,
        chunk.end,
        chunk.digest.as_deref(),
    );
    assert!(matches!(reply, EnvelopeKind::FilePutResponse { ok: true, .. }));
    assert!(receivers.is_empty());

    let committed = std::fs::read(dir.path().join("notes/a.txt")).expect("committed file");
    assert_eq!(committed, b"put me");
}

#[test]
fn handle_put_chunk_rejects_path_escape() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut receivers: HashMap<String, ChunkReceiver> = HashMap::new();
    let reply = handle_put_chunk(Some(dir.path()), &mut receivers, "req-1", "../escape.txt", 0, "aGk=", true, Some("x"));
    assert!(matches!(reply, EnvelopeKind::FilePutResponse { ok: false, .. }));
}

#[test]
fn handle_put_chunk_without_a_root_is_rejected() {
    let mut receivers: HashMap<String, ChunkReceiver> = HashMap::new();
    let reply = handle_put_chunk(None, &mut receivers, "req-1", "a.txt", 0, "aGk=", true, Some("x"));
    assert!(matches!(reply, EnvelopeKind::FilePutResponse { ok: false, .. }));
}

#[test]
fn handle_get_request_splits_a_file_into_verifiable_chunks() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("asset.bin"), b"the contents").expect("seed file");

    let frames = handle_get_request(Some(dir.path()), "asset.bin");
    let mut receiver = ChunkReceiver::new();
    let mut assembled = None;
    for frame in frames {
        let EnvelopeKind::FileGetResponse { offset, end, digest, data, ok, .. } = frame else {
            panic!("expected FileGetResponse");
        };
        assert!(ok);
        if let Some(bytes) = receiver.accept_chunk(offset, &data, end, digest.as_deref()).expect("accept") {
            assembled = Some(bytes);
        }
    }
    assert_eq!(assembled, Some(b"the contents".to_vec()));
}

#[test]
fn handle_get_request_reports_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = handle_get_request(Some(dir.path()), "missing.bin");
    assert_eq!(frames.len(), 1);
    assert!(matches!(frames[0], EnvelopeKind::FileGetResponse { ok: false, .. }));
}

#[test]
fn tampered_bytes_fail_digest_check() {
    let data = b"original bytes".to_vec();
    let mut sender = ChunkSender::new(&data);
    let chunk = sender.next_chunk().expect("chunk");

    let mut receiver = ChunkReceiver::new();
    // Corrupt the payload the receiver sees while keeping the sender's digest.
    let tampered_b64 = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b"tampered bytes!");
    let result = receiver.accept_chunk(chunk.offset, &tampered_b64, chunk.end, chunk.digest.as_deref());
    assert!(matches!(result, Err(TransferError::DigestMismatch { .. })));
}
