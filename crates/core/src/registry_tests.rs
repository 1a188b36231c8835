use super::*;
use crate::slave::SlaveIdentity;

#[test]
fn new_entry_starts_offline_with_no_channel() {
    let entry: RegistryEntry<u32> =
        RegistryEntry::new(SlaveIdentity::new("s1", "Slave", "1.0"), "gw-1", 100);
    assert_eq!(entry.status, RegistryStatus::Offline);
    assert!(entry.channel.is_none());
    assert!(!entry.is_online());
}

#[test]
fn is_online_requires_both_status_and_channel() {
    let mut entry: RegistryEntry<u32> =
        RegistryEntry::new(SlaveIdentity::new("s1", "Slave", "1.0"), "gw-1", 100);
    entry.status = RegistryStatus::Online;
    assert!(!entry.is_online(), "status alone is not enough");
    entry.channel = Some(42);
    assert!(entry.is_online());
}

#[test]
fn snapshot_drops_the_channel() {
    let mut entry: RegistryEntry<u32> =
        RegistryEntry::new(SlaveIdentity::new("s1", "Slave", "1.0"), "gw-1", 100);
    entry.channel = Some(7);
    entry.in_flight = 3;
    let snap = entry.snapshot();
    assert_eq!(snap.in_flight, 3);
    assert_eq!(snap.identity, entry.identity);
}
