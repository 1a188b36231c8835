use super::*;

#[test]
fn fake_clock_advances_by_duration() {
    let clock = FakeClock::new(100);
    assert_eq!(clock.now_secs(), 100);
    clock.advance(Duration::from_secs(30));
    assert_eq!(clock.now_secs(), 130);
}

#[test]
fn fake_clock_set_is_absolute() {
    let clock = FakeClock::new(100);
    clock.set(500);
    assert_eq!(clock.now_secs(), 500);
}

#[test]
fn system_clock_now_ms_is_increasing() {
    let clock = SystemClock;
    let a = clock.now_ms();
    assert!(a > 0);
    let b = clock.now_ms();
    assert!(b >= a);
}
