use super::*;

#[test]
fn pending_can_move_forward() {
    assert!(AgentStatus::Pending.can_transition_to(AgentStatus::Running));
    assert!(AgentStatus::Running.can_transition_to(AgentStatus::Completed));
    assert!(AgentStatus::Running.can_transition_to(AgentStatus::Failed));
    assert!(AgentStatus::Running.can_transition_to(AgentStatus::Cancelled));
}

#[test]
fn same_state_transition_is_idempotent() {
    assert!(AgentStatus::Running.can_transition_to(AgentStatus::Running));
    assert!(AgentStatus::Completed.can_transition_to(AgentStatus::Completed));
}

#[test]
fn terminal_cannot_go_backward() {
    assert!(!AgentStatus::Completed.can_transition_to(AgentStatus::Running));
    assert!(!AgentStatus::Failed.can_transition_to(AgentStatus::Pending));
}

#[test]
fn terminal_cannot_flip_to_a_different_terminal() {
    assert!(!AgentStatus::Completed.can_transition_to(AgentStatus::Failed));
    assert!(!AgentStatus::Cancelled.can_transition_to(AgentStatus::Completed));
}

#[test]
fn running_cannot_go_back_to_pending() {
    assert!(!AgentStatus::Running.can_transition_to(AgentStatus::Pending));
}

#[test]
fn is_stale_only_applies_to_running_agents_past_threshold() {
    let mut agent = Agent::pending(AgentId::new("a1"), 1_000);
    agent.status = AgentStatus::Running;
    agent.updated_at_ms = 1_000;
    assert!(!agent.is_stale(1_500, 1_000));
    assert!(agent.is_stale(2_001, 1_000));

    let mut completed = agent.clone();
    completed.status = AgentStatus::Completed;
    assert!(!completed.is_stale(10_000_000, 1_000));
}

#[test]
fn display_is_snake_case() {
    assert_eq!(AgentStatus::Cancelled.to_string(), "cancelled");
}
