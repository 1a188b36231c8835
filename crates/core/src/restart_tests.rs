use super::*;

#[test]
fn new_record_has_current_version_and_requested_status() {
    let rec = RestartSentinelRecord::new(RestartKind::Slave, 1_000, 42, "config changed");
    assert_eq!(rec.version, RESTART_SENTINEL_VERSION);
    assert_eq!(rec.status, RestartStatus::Requested);
    assert_eq!(rec.pid, 42);
    assert_eq!(rec.note, "config changed");
}

#[test]
fn serde_round_trip() {
    let rec = RestartSentinelRecord::new(RestartKind::Master, 5, 1, "note");
    let json = serde_json::to_string(&rec).unwrap();
    let back: RestartSentinelRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(rec, back);
}

#[test]
fn supervisor_exit_code_is_23() {
    assert_eq!(SUPERVISOR_RESTART_EXIT_CODE, 23);
}
