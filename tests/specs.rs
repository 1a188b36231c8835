//! End-to-end tests against the `mesh` binary, exercised the way a user
//! would invoke it from a shell.

use assert_cmd::Command;
use std::process::Output;
use tempfile::tempdir;

fn mesh() -> Command {
    Command::cargo_bin("mesh").expect("mesh binary builds")
}

trait OutputExt {
    fn stdout_str(&self) -> String;
    fn stderr_str(&self) -> String;
}

impl OutputExt for Output {
    fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[test]
fn init_writes_default_config_at_explicit_path() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");

    let output = mesh()
        .args(["--init", "--config"])
        .arg(&config_path)
        .output()
        .expect("mesh runs");
    assert!(output.status.success(), "stderr: {}", output.stderr_str());
    assert!(output.stdout_str().contains("wrote default config"));

    let contents = std::fs::read_to_string(&config_path).expect("config written");
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
    assert!(parsed.get("cluster").is_some());
    assert!(parsed.get("start_params").is_some());
}

#[test]
fn init_writes_config_matching_the_documented_default_shape() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");

    let output = mesh()
        .args(["--init", "--config"])
        .arg(&config_path)
        .output()
        .expect("mesh runs");
    assert!(output.status.success());

    let contents = std::fs::read_to_string(&config_path).expect("config written");
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
    similar_asserts::assert_eq!(
        parsed,
        serde_json::json!({
            "model": null,
            "cluster": {
                "secret": null,
                "tls": {
                    "enabled": false,
                    "cert_path": null,
                    "key_path": null,
                    "insecure_skip_verify": false,
                },
                "heartbeat_interval_secs": null,
                "max_inflight_runs": null,
                "redis_url": null,
            },
            "files": {
                "max_frame_bytes": null,
                "transfer_chunk_bytes": null,
            },
            "multi_agent_root": null,
            "start_params": {
                "master": {
                    "listen": null,
                    "ws_path": null,
                    "redis_url": null,
                    "heartbeat_interval_secs": null,
                },
                "slave": {
                    "master": null,
                    "id": null,
                    "name": null,
                    "tags": null,
                    "heartbeat_interval_secs": null,
                    "max_inflight_runs": null,
                    "insecure_skip_verify": null,
                },
            },
            "assistant": {
                "reply_style": null,
                "auto_compaction": null,
            },
        })
    );
}

#[test]
fn init_does_not_overwrite_an_existing_config() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, br#"{"multi_agent_root":"/custom/root"}"#).expect("seed config");

    let output = mesh()
        .args(["--init", "--config"])
        .arg(&config_path)
        .output()
        .expect("mesh runs");
    assert!(output.status.success());
    assert!(output.stdout_str().contains("already exists"));

    let contents = std::fs::read_to_string(&config_path).expect("config untouched");
    assert!(contents.contains("/custom/root"));
}

#[test]
fn malformed_config_file_exits_with_error() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, b"not json").expect("seed bad config");

    let output = mesh()
        .args(["--config"])
        .arg(&config_path)
        .write_stdin("")
        .output()
        .expect("mesh runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr_str().contains("Error:"));
}

#[test]
fn chat_with_empty_stdin_exits_cleanly_without_a_task() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("runs");

    let output = mesh()
        .env("MESH_CONFIG_DIR", dir.path())
        .arg("--multi-agent-root")
        .arg(&root)
        .write_stdin("")
        .output()
        .expect("mesh runs");
    assert!(output.status.success(), "stderr: {}", output.stderr_str());
    assert!(output.stdout_str().contains("no task given"));
}

#[test]
fn worker_requires_run_id_and_agent_id_flags() {
    let output = mesh().arg("worker").output().expect("mesh runs");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn worker_without_mesh_worker_root_env_fails_loudly() {
    let output = mesh()
        .env_remove(mesh_coordinator::ENV_WORKER_ROOT)
        .args(["worker", "--run-id", "run-1", "--agent-id", "agent-1"])
        .output()
        .expect("mesh runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr_str().contains(mesh_coordinator::ENV_WORKER_ROOT));
}

#[test]
fn slave_without_cluster_secret_fails_before_dialing_out() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, br#"{}"#).expect("seed config with no cluster secret");

    let output = mesh()
        .args(["--config"])
        .arg(&config_path)
        .args(["slave", "--master", "ws://127.0.0.1:1/ws"])
        .output()
        .expect("mesh runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr_str().contains("secret"));
}

#[test]
fn help_lists_all_modes() {
    let output = mesh().arg("--help").output().expect("mesh runs");
    assert!(output.status.success());
    let stdout = output.stdout_str();
    for mode in ["chat", "master", "slave", "worker", "skills"] {
        assert!(stdout.contains(mode), "help output missing `{mode}`:\n{stdout}");
    }
}

#[test]
fn init_honors_mesh_config_dir_when_no_explicit_path_given() {
    let dir = tempdir().expect("tempdir");
    let output = mesh()
        .env("MESH_CONFIG_DIR", dir.path())
        .arg("--init")
        .output()
        .expect("mesh runs");
    assert!(output.status.success(), "stderr: {}", output.stderr_str());
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn init_falls_back_to_the_platform_config_dir_without_mesh_config_dir() {
    let xdg_home = tempdir().expect("tempdir");
    let output = mesh()
        .env_remove("MESH_CONFIG_DIR")
        .env("XDG_CONFIG_HOME", xdg_home.path())
        .env("HOME", xdg_home.path())
        .arg("--init")
        .output()
        .expect("mesh runs");
    assert!(output.status.success(), "stderr: {}", output.stderr_str());

    let expected_dir = xdg_home.path().join("mesh");
    assert!(
        expected_dir.join("config.json").exists(),
        "expected config under {}",
        expected_dir.display()
    );
}
