use super::{CoordinatorPolicy, SubagentExecution};

#[test]
fn default_policy_always_spawns() {
    let policy = CoordinatorPolicy::default();
    assert_eq!(policy.subagent_execution, SubagentExecution::AlwaysSpawn);
    assert_eq!(policy.staleness_threshold_ms, 60_000);
    assert_eq!(policy.prune_min_keep, 5);
}
