use super::*;

fn sample() -> Envelope {
    Envelope::new(
        "req-1",
        1_700_000_000,
        EnvelopeKind::Heartbeat,
    )
}

#[test]
fn encode_decode_round_trips() {
    let env = sample();
    let bytes = env.encode(DEFAULT_MAX_FRAME_BYTES).unwrap();
    let back = Envelope::decode(&bytes, DEFAULT_MAX_FRAME_BYTES).unwrap();
    assert_eq!(env, back);
}

#[test]
fn encode_rejects_oversize_frame() {
    let env = Envelope::new(
        "req-1",
        1,
        EnvelopeKind::AgentEvent {
            event: serde_json::json!({ "blob": "x".repeat(100) }),
        },
    );
    let err = env.encode(10).unwrap_err();
    assert!(matches!(err, EnvelopeError::TooLarge { .. }));
}

#[test]
fn decode_rejects_oversize_before_parsing() {
    let bytes = vec![0u8; 100];
    let err = Envelope::decode(&bytes, 10).unwrap_err();
    assert!(matches!(err, EnvelopeError::TooLarge { .. }));
}

#[test]
fn decode_rejects_malformed_json() {
    let err = Envelope::decode(b"not json", DEFAULT_MAX_FRAME_BYTES).unwrap_err();
    assert!(matches!(err, EnvelopeError::Json(_)));
}

#[test]
fn agent_event_is_streamable_others_are_not() {
    assert!(EnvelopeKind::AgentEvent {
        event: serde_json::Value::Null
    }
    .is_streamable());
    assert!(!EnvelopeKind::Heartbeat.is_streamable());
    assert!(!EnvelopeKind::AgentResult {
        status: "completed".into(),
        output: None,
        run_id: None,
        error: None,
    }
    .is_streamable());
}

#[test]
fn error_reply_echoes_request_id() {
    let env = sample();
    let reply = env.error_reply(crate::ErrorKind::Timeout, "too slow", 42);
    assert_eq!(reply.request_id, env.request_id);
    assert_eq!(reply.timestamp, 42);
    match reply.kind {
        EnvelopeKind::Error { kind, message } => {
            assert_eq!(kind, crate::ErrorKind::Timeout);
            assert_eq!(message, "too slow");
        }
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn tag_matches_wire_name() {
    assert_eq!(EnvelopeKind::Heartbeat.tag(), "heartbeat");
    assert_eq!(
        EnvelopeKind::AgentRun {
            task: "x".into(),
            options: serde_json::Value::Null,
            metadata: serde_json::Value::Null,
        }
        .tag(),
        "agent.run"
    );
}

#[test]
fn unknown_optional_fields_are_ignored_on_register_ack() {
    let json = serde_json::json!({
        "request_id": "r1",
        "timestamp": 1,
        "version": 1,
        "kind": "register_ack",
        "payload": {
            "accepted": true,
            "reason": null,
            "heartbeat_interval_secs": 5,
            "server_instance_id": "inst-1",
            "unexpected_future_field": "ignored"
        }
    });
    let env: Envelope = serde_json::from_value(json).unwrap();
    match env.kind {
        EnvelopeKind::RegisterAck { accepted, .. } => assert!(accepted),
        other => panic!("unexpected: {other:?}"),
    }
}
