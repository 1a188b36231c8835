use super::*;
use mesh_core::RestartKind;
use tempfile::tempdir;

#[test]
fn request_restart_persists_and_flags_in_memory() {
    let dir = tempdir().expect("tempdir");
    let manager = RestartManager::new(dir.path().join("restart-sentinel.json"));
    assert!(!manager.is_restart_requested());

    manager
        .request_restart(RestartKind::Master, 1_000, 42, "config reload")
        .expect("request restart");

    assert!(manager.is_restart_requested());
    assert!(manager.sentinel_path().exists());
}

#[test]
fn consume_sentinel_reads_and_deletes_then_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let manager = RestartManager::new(dir.path().join("restart-sentinel.json"));
    manager
        .request_restart(RestartKind::Slave, 2_000, 7, "upgrade")
        .expect("request restart");

    let record = manager.consume_sentinel().expect("sentinel present");
    assert_eq!(record.pid, 7);
    assert_eq!(record.kind, RestartKind::Slave);
    assert!(!manager.sentinel_path().exists());

    assert!(manager.consume_sentinel().is_none());
}

#[test]
fn consume_sentinel_deletes_malformed_file_silently() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("restart-sentinel.json");
    std::fs::write(&path, b"not json").expect("write garbage");
    let manager = RestartManager::new(&path);

    assert!(manager.consume_sentinel().is_none());
    assert!(!path.exists());
}
