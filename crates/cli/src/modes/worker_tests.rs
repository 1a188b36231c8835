use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn run_fails_fast_without_worker_root_env() {
    std::env::remove_var(mesh_coordinator::ENV_WORKER_ROOT);
    let args = WorkerArgs {
        run_id: "run-1".to_string(),
        agent_id: "agent-1".to_string(),
    };
    let err = run(args).await.expect_err("missing env var should fail");
    assert!(err.to_string().contains(mesh_coordinator::ENV_WORKER_ROOT));
}
