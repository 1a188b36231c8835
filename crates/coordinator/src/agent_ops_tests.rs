use super::WorkerExecInfo;
use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::policy::CoordinatorPolicy;
use mesh_core::{AgentLimits, AgentStatus, FakeClock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn new_coordinator() -> (Coordinator, FakeClock) {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::default();
    let coordinator = Coordinator::new(dir.path().to_path_buf(), Arc::new(clock.clone()), CoordinatorPolicy::default());
    (coordinator, clock)
}

#[test]
fn create_agent_requires_an_existing_run() {
    let (coordinator, _clock) = new_coordinator();
    let result = coordinator.create_agent("nonexistent", "do work".into(), AgentLimits::default(), serde_json::Value::Null, false);
    assert!(matches!(result, Err(CoordinatorError::RunNotFound(_))));
}

#[test]
fn create_agent_then_read_state_round_trips() {
    let (coordinator, _clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "do work".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");

    assert_eq!(agent.status, AgentStatus::Pending);
    let fetched = coordinator.read_state(run.id.as_str(), agent.id.as_str()).expect("read state");
    assert_eq!(fetched, agent);

    let spec = coordinator.read_spec(run.id.as_str(), agent.id.as_str()).expect("read spec");
    assert_eq!(spec.task, "do work");
}

#[test]
fn update_state_rejects_backward_transitions() {
    let (coordinator, _clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "t".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");

    coordinator
        .update_state(run.id.as_str(), agent.id.as_str(), |a| a.status = AgentStatus::Completed)
        .expect("forward transition");

    let result = coordinator.update_state(run.id.as_str(), agent.id.as_str(), |a| a.status = AgentStatus::Running);
    assert!(matches!(result, Err(CoordinatorError::InvalidTransition { .. })));
}

#[test]
fn read_state_reclassifies_stale_running_agent_as_failed() {
    let (coordinator, clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "t".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");
    coordinator
        .update_state(run.id.as_str(), agent.id.as_str(), |a| a.status = AgentStatus::Running)
        .expect("mark running");

    clock.advance(Duration::from_secs(120));

    let reclassified = coordinator.read_state(run.id.as_str(), agent.id.as_str()).expect("read state");
    assert_eq!(reclassified.status, AgentStatus::Failed);
    assert!(reclassified.error.is_some());

    let result = coordinator.read_result(run.id.as_str(), agent.id.as_str()).expect("read result");
    assert_eq!(result["error"], serde_json::json!("worker heartbeat went stale"));
}

#[test]
fn write_result_then_read_result_round_trips() {
    let (coordinator, _clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "t".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");

    let payload = serde_json::json!({"output": "4"});
    coordinator.write_result(run.id.as_str(), agent.id.as_str(), &payload).expect("write result");
    let read_back = coordinator.read_result(run.id.as_str(), agent.id.as_str()).expect("read result");
    assert_eq!(read_back, payload);
}

#[test]
fn hide_and_show_toggle_default_listing() {
    let (coordinator, _clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "t".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");

    coordinator.hide_agent(run.id.as_str(), agent.id.as_str()).expect("hide");
    let visible = coordinator.list_agents(run.id.as_str(), false).expect("list visible");
    assert!(visible.is_empty());
    let all = coordinator.list_agents(run.id.as_str(), true).expect("list all");
    assert_eq!(all.len(), 1);

    coordinator.show_agent(run.id.as_str(), agent.id.as_str()).expect("show");
    let visible_again = coordinator.list_agents(run.id.as_str(), false).expect("list visible again");
    assert_eq!(visible_again.len(), 1);
}

#[test]
fn spawn_worker_records_pid_and_marks_running() {
    let (coordinator, _clock) = new_coordinator();
    let run = coordinator.create_run(HashMap::new()).expect("create run");
    let agent = coordinator
        .create_agent(run.id.as_str(), "t".into(), AgentLimits::default(), serde_json::Value::Null, false)
        .expect("create agent");

    let exec = WorkerExecInfo {
        binary: Some(std::path::PathBuf::from("/bin/true")),
        ..WorkerExecInfo::default()
    };
    let pid = coordinator.spawn_worker(run.id.as_str(), agent.id.as_str(), &exec).expect("spawn");
    assert!(pid > 0);

    let state = coordinator.read_state(run.id.as_str(), agent.id.as_str()).expect("read state");
    assert_eq!(state.pid, Some(pid));
    assert_eq!(state.status, AgentStatus::Running);
}
