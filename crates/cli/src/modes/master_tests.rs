use super::*;

#[test]
fn flag_overrides_config_and_default() {
    let args = MasterArgs {
        listen: Some("0.0.0.0:9999".to_string()),
        ..Default::default()
    };
    let resolved = resolve(&args, &Config::default());
    assert_eq!(resolved.listen, "0.0.0.0:9999");
    assert_eq!(resolved.ws_path, DEFAULT_WS_PATH);
}

#[test]
fn config_start_params_used_when_no_flag() {
    let mut config = Config::default();
    config.start_params.master.ws_path = Some("/gateway".to_string());
    config.start_params.master.heartbeat_interval_secs = Some(5);
    let resolved = resolve(&MasterArgs::default(), &config);
    assert_eq!(resolved.ws_path, "/gateway");
    assert_eq!(resolved.heartbeat_interval_secs, 5);
}

#[test]
fn cluster_redis_url_is_fallback_for_start_params() {
    let mut config = Config::default();
    config.cluster.redis_url = Some("redis://cluster-wide".to_string());
    let resolved = resolve(&MasterArgs::default(), &config);
    assert_eq!(resolved.redis_url.as_deref(), Some("redis://cluster-wide"));

    config.start_params.master.redis_url = Some("redis://start-params".to_string());
    let resolved = resolve(&MasterArgs::default(), &config);
    assert_eq!(resolved.redis_url.as_deref(), Some("redis://start-params"));
}

#[test]
fn defaults_apply_with_nothing_configured() {
    let resolved = resolve(&MasterArgs::default(), &Config::default());
    assert_eq!(resolved.listen, DEFAULT_LISTEN);
    assert_eq!(resolved.ws_path, DEFAULT_WS_PATH);
    assert_eq!(resolved.redis_url, None);
    assert_eq!(resolved.heartbeat_interval_secs, 20);
}

#[test]
fn missing_cluster_secret_is_generated_and_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let mut config = Config::default();
    assert!(config.cluster.secret.is_none());

    let secret = load_or_generate_cluster_secret(&mut config, &config_path).expect("generate");
    assert_eq!(secret.as_bytes().len(), CLUSTER_SECRET_LEN);
    assert!(config.cluster.secret.is_some());

    let reloaded = Config::load(Some(&config_path)).expect("reload");
    assert_eq!(reloaded.cluster.secret, config.cluster.secret);
}

#[test]
fn existing_cluster_secret_is_reused_without_rewriting_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let mut config = Config::default();
    config.cluster.secret = Some(base64::engine::general_purpose::STANDARD.encode([7u8; 32]));

    let secret = load_or_generate_cluster_secret(&mut config, &config_path).expect("reuse");
    assert_eq!(secret.as_bytes(), &[7u8; 32]);
    assert!(!config_path.exists());
}

#[test]
fn invalid_base64_cluster_secret_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let mut config = Config::default();
    config.cluster.secret = Some("not valid base64!!".to_string());

    assert!(load_or_generate_cluster_secret(&mut config, &config_path).is_err());
}
