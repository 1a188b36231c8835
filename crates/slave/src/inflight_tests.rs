use super::*;

#[test]
fn default_capacity_one_admits_one_then_refuses() {
    let gate = InflightGate::new(1);
    let first = gate.try_acquire();
    assert!(first.is_some());
    assert!(gate.try_acquire().is_none());

    drop(first);
    assert!(gate.try_acquire().is_some());
}

#[test]
fn capacity_above_one_admits_that_many_concurrently() {
    let gate = InflightGate::new(3);
    let a = gate.try_acquire();
    let b = gate.try_acquire();
    let c = gate.try_acquire();
    assert!(a.is_some() && b.is_some() && c.is_some());
    assert!(gate.try_acquire().is_none());
}
