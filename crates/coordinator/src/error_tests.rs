use super::CoordinatorError;
use mesh_core::ErrorKind;

#[test]
fn run_not_found_maps_to_protocol_error() {
    let err = CoordinatorError::RunNotFound("run_1".into());
    assert_eq!(err.kind(), ErrorKind::ProtocolError);
}

#[test]
fn signal_timeout_maps_to_timeout() {
    let err = CoordinatorError::SignalTimeout { name: "go".into() };
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn id_exhausted_maps_to_io_error() {
    let err = CoordinatorError::IdExhausted { attempts: 8 };
    assert_eq!(err.kind(), ErrorKind::IoError);
}
