use super::*;

#[test]
fn first_delay_is_bounded_by_initial() {
    let mut backoff = Backoff::new();
    let delay = backoff.next_delay();
    assert!(delay <= INITIAL);
}

#[test]
fn delay_bound_doubles_then_caps() {
    let mut backoff = Backoff::new();
    for _ in 0..10 {
        let delay = backoff.next_delay();
        assert!(delay <= CAP);
    }
}

#[test]
fn reset_only_happens_once_stable_threshold_met() {
    let mut backoff = Backoff::new();
    backoff.next_delay();
    backoff.next_delay();
    assert_eq!(backoff.attempt, 2);

    backoff.note_live_for(Duration::from_secs(10));
    assert_eq!(backoff.attempt, 2, "below stable threshold, no reset");

    backoff.note_live_for(STABLE_AFTER);
    assert_eq!(backoff.attempt, 0);
}
