use super::*;

#[test]
fn llm_error_maps_to_remote_error() {
    let err = WorkerError::Llm(crate::llm::LlmError::Provider("boom".to_string()));
    assert_eq!(err.kind(), ErrorKind::RemoteError);
}
