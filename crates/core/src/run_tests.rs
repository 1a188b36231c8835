use super::*;

#[test]
fn new_run_is_open() {
    let run = Run::new(RunId::new("run_abc"), 1000, HashMap::new());
    assert_eq!(run.status, RunStatus::Open);
}

#[test]
fn close_transitions_to_closed() {
    let mut run = Run::new(RunId::new("run_abc"), 1000, HashMap::new());
    run.close();
    assert_eq!(run.status, RunStatus::Closed);
}
