use super::*;

#[test]
fn matches_requires_same_name_and_higher_seq() {
    let sig = Signal::new("ready", 5, 100, serde_json::Value::Null);
    assert!(sig.matches("ready", 4));
    assert!(!sig.matches("ready", 5));
    assert!(!sig.matches("ready", 6));
    assert!(!sig.matches("other", 4));
}
