use super::{NoopPresenceStore, PresenceStore};
use mesh_core::PresenceRecord;

#[tokio::test]
async fn noop_store_never_remembers_anything() {
    let store = NoopPresenceStore;
    let record = PresenceRecord::online("slave-1", "laptop", 1_700_000_000);
    store.set(&record, 60).await.expect("set");
    let fetched = store.get("slave-1").await.expect("get");
    assert!(fetched.is_none());
}

#[tokio::test]
async fn noop_store_remove_is_always_ok() {
    let store = NoopPresenceStore;
    store.remove("anything").await.expect("remove");
}
