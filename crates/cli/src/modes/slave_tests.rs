use super::*;

#[test]
fn parse_tag_splits_on_first_equals() {
    assert_eq!(parse_tag("region=us-east"), Ok(("region".to_string(), "us-east".to_string())));
    assert_eq!(parse_tag("k=v=w"), Ok(("k".to_string(), "v=w".to_string())));
}

#[test]
fn parse_tag_rejects_missing_equals() {
    assert!(parse_tag("no-equals-sign").is_err());
}

#[test]
fn flag_wins_over_config_for_id_and_name() {
    let args = SlaveArgs {
        id: Some("slave-flag".to_string()),
        name: Some("flag-name".to_string()),
        ..Default::default()
    };
    let mut config = Config::default();
    config.start_params.slave.id = Some("slave-config".to_string());
    config.start_params.slave.name = Some("config-name".to_string());

    let identity = resolve_identity(&args, &config);
    assert_eq!(identity.slave_id.as_deref(), Some("slave-flag"));
    assert_eq!(identity.display_name_override.as_deref(), Some("flag-name"));
}

#[test]
fn max_inflight_falls_back_to_cluster_section() {
    let mut config = Config::default();
    config.cluster.max_inflight_runs = Some(7);
    let identity = resolve_identity(&SlaveArgs::default(), &config);
    assert_eq!(identity.max_inflight, 7);
}

#[test]
fn insecure_skip_verify_is_true_if_any_source_sets_it() {
    let mut config = Config::default();
    config.cluster.tls.insecure_skip_verify = true;
    let identity = resolve_identity(&SlaveArgs::default(), &config);
    assert!(identity.insecure_skip_verify);
}

#[test]
fn identity_defaults_are_unset_and_safe() {
    let identity = resolve_identity(&SlaveArgs::default(), &Config::default());
    assert_eq!(identity.slave_id, None);
    assert_eq!(identity.display_name_override, None);
    assert_eq!(identity.max_inflight, 1);
    assert!(!identity.insecure_skip_verify);
}
