use super::*;

define_id! {
    pub struct TestId;
}

#[test]
fn short_truncates() {
    let id = TestId::new("0123456789abcdef");
    assert_eq!(id.short(8), "01234567");
}

#[test]
fn short_no_truncation_when_shorter_than_n() {
    let id = TestId::new("abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn display_matches_inner_string() {
    let id = TestId::new("xyz");
    assert_eq!(format!("{id}"), "xyz");
}

#[test]
fn eq_str_and_borrow() {
    let id = TestId::new("abc");
    assert_eq!(id, "abc");
    assert_eq!(id, *"abc".to_string());
    let s: &str = std::borrow::Borrow::borrow(&id);
    assert_eq!(s, "abc");
}

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("run");
    assert_eq!(gen.next(), "run-1");
    assert_eq!(gen.next(), "run-2");
}

#[test]
fn uuid_id_gen_produces_unique_ids() {
    let gen = UuidIdGen;
    assert_ne!(gen.next(), gen.next());
}

#[test]
fn short_token_has_tag_prefix_and_length() {
    let tok = short_token("run");
    assert!(tok.starts_with("run_"));
    assert_eq!(tok.len(), "run_".len() + 12);
}

#[test]
fn short_token_is_reasonably_unique() {
    let a = short_token("agt");
    let b = short_token("agt");
    assert_ne!(a, b);
}
