use super::{PrunePolicy, RunFilter};
use crate::coordinator::Coordinator;
use crate::policy::CoordinatorPolicy;
use mesh_core::{FakeClock, RunStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn coordinator_with_min_keep(clock: FakeClock, min_keep: usize) -> Coordinator {
    let dir = tempdir().expect("tempdir");
    let policy = CoordinatorPolicy {
        prune_min_keep: min_keep,
        ..CoordinatorPolicy::default()
    };
    Coordinator::new(dir.path().to_path_buf(), Arc::new(clock), policy)
}

#[test]
fn create_run_round_trips_through_get_run() {
    let coordinator = coordinator_with_min_keep(FakeClock::default(), 5);
    let mut meta = HashMap::new();
    meta.insert("title".to_string(), "demo".to_string());

    let run = coordinator.create_run(meta).expect("create");
    let fetched = coordinator.get_run(run.id.as_str()).expect("get");
    assert_eq!(fetched, run);
    assert_eq!(fetched.status, RunStatus::Open);
}

#[test]
fn list_runs_orders_newest_first_and_applies_text_filter() {
    let clock = FakeClock::default();
    let coordinator = coordinator_with_min_keep(clock.clone(), 5);

    let mut meta_a = HashMap::new();
    meta_a.insert("title".to_string(), "alpha task".to_string());
    let run_a = coordinator.create_run(meta_a).expect("create a");

    clock.advance(Duration::from_secs(10));
    let mut meta_b = HashMap::new();
    meta_b.insert("title".to_string(), "beta task".to_string());
    let run_b = coordinator.create_run(meta_b).expect("create b");

    let all = coordinator.list_runs(&RunFilter::default()).expect("list");
    assert_eq!(all.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec![run_b.id.as_str(), run_a.id.as_str()]);

    let filtered = coordinator
        .list_runs(&RunFilter {
            status: None,
            text: Some("ALPHA".into()),
        })
        .expect("list filtered");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, run_a.id);
}

#[test]
fn list_runs_on_missing_root_is_empty() {
    let dir = tempdir().expect("tempdir");
    let missing_root = dir.path().join("does-not-exist-yet");
    let coordinator = Coordinator::new(missing_root, Arc::new(FakeClock::default()), CoordinatorPolicy::default());
    let runs = coordinator.list_runs(&RunFilter::default()).expect("list");
    assert!(runs.is_empty());
}

#[test]
fn prune_keeps_min_keep_even_when_everything_is_stale() {
    let clock = FakeClock::default();
    let coordinator = coordinator_with_min_keep(clock.clone(), 1);
    let _old = coordinator.create_run(HashMap::new()).expect("create old");
    clock.advance(Duration::from_secs(1_000));
    let _new = coordinator.create_run(HashMap::new()).expect("create new");

    let deleted = coordinator
        .prune(&PrunePolicy {
            max_age_ms: Some(1),
            max_count: None,
        })
        .expect("prune");

    // min_keep=1 protects the newest run; only the older one is a candidate.
    assert_eq!(deleted.len(), 1);
    let remaining = coordinator.list_runs(&RunFilter::default()).expect("list");
    assert_eq!(remaining.len(), 1);
}

#[test]
fn prune_respects_max_count_beyond_min_keep() {
    let clock = FakeClock::default();
    let coordinator = coordinator_with_min_keep(clock.clone(), 1);
    for _ in 0..4 {
        coordinator.create_run(HashMap::new()).expect("create");
        clock.advance(Duration::from_secs(1));
    }

    let deleted = coordinator
        .prune(&PrunePolicy {
            max_age_ms: None,
            max_count: Some(2),
        })
        .expect("prune");

    assert_eq!(deleted.len(), 2);
    let remaining = coordinator.list_runs(&RunFilter::default()).expect("list");
    assert_eq!(remaining.len(), 2);
}
