use super::SlaveRegistry;
use crate::connection::ConnectionHandle;
use mesh_core::{Envelope, EnvelopeKind, RegistryStatus, SlaveIdentity};

fn identity(id: &str) -> SlaveIdentity {
    SlaveIdentity::new(id, "laptop", "1.0.0")
}

#[test]
fn upsert_is_online_and_visible_in_snapshot() {
    let registry = SlaveRegistry::new();
    let (conn, _rx, _close_requested, _cancel) = ConnectionHandle::new("c1");
    registry.upsert(identity("slave-1"), "gw-1", conn, 100);

    assert!(registry.is_online("slave-1"));
    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].status, RegistryStatus::Online);
}

#[test]
fn second_upsert_displaces_first_connection() {
    let registry = SlaveRegistry::new();
    let (conn1, _rx1, _close_requested1, _cancel1) = ConnectionHandle::new("c1");
    let (conn2, _rx2, _close_requested2, _cancel2) = ConnectionHandle::new("c2");

    registry.upsert(identity("slave-1"), "gw-1", conn1, 100);
    let outcome = registry.upsert(identity("slave-1"), "gw-1", conn2, 101);

    assert!(outcome.displaced.is_some());
    assert_eq!(outcome.displaced.unwrap().connection_id, "c1");
    assert!(registry.is_online("slave-1"));
}

#[test]
fn mark_offline_clears_channel_but_keeps_entry() {
    let registry = SlaveRegistry::new();
    let (conn, _rx, _close_requested, _cancel) = ConnectionHandle::new("c1");
    registry.upsert(identity("slave-1"), "gw-1", conn, 100);

    registry.mark_offline("slave-1", 200);

    assert!(!registry.is_online("slave-1"));
    let snap = registry.snapshot_one("slave-1").expect("entry still present");
    assert_eq!(snap.status, RegistryStatus::Offline);
}

#[test]
fn forget_removes_entry_entirely() {
    let registry = SlaveRegistry::new();
    let (conn, _rx, _close_requested, _cancel) = ConnectionHandle::new("c1");
    registry.upsert(identity("slave-1"), "gw-1", conn, 100);

    assert!(registry.forget("slave-1"));
    assert!(registry.snapshot_one("slave-1").is_none());
    assert!(!registry.forget("slave-1"));
}

#[test]
fn send_to_offline_slave_fails() {
    let registry = SlaveRegistry::new();
    let sent = registry.send_to("nobody", Envelope::new("r1", 1, EnvelopeKind::Heartbeat));
    assert!(!sent);
}

#[test]
fn send_to_online_slave_delivers_envelope() {
    let registry = SlaveRegistry::new();
    let (conn, mut rx, _close_requested, _cancel) = ConnectionHandle::new("c1");
    registry.upsert(identity("slave-1"), "gw-1", conn, 100);

    let sent = registry.send_to("slave-1", Envelope::new("r1", 1, EnvelopeKind::Heartbeat));
    assert!(sent);
    assert!(rx.try_recv().is_ok());
}

#[test]
fn touch_updates_last_seen_without_changing_status() {
    let registry = SlaveRegistry::new();
    let (conn, _rx, _close_requested, _cancel) = ConnectionHandle::new("c1");
    registry.upsert(identity("slave-1"), "gw-1", conn, 100);
    registry.touch("slave-1", 500);

    let snap = registry.snapshot_one("slave-1").expect("entry");
    assert_eq!(snap.last_seen_secs, 500);
    assert_eq!(snap.status, RegistryStatus::Online);
}
