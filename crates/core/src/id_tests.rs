use super::*;

#[test]
fn monotonic_gen_produces_strictly_increasing_ids_same_millisecond() {
    let gen = MonotonicUlidGen::new();
    let mut prev = gen.next_task_id();
    for _ in 0..50 {
        let next = gen.next_task_id();
        assert!(next > prev, "{next} should sort after {prev}");
        prev = next;
    }
}

#[test]
fn sequential_gen_is_deterministic_and_ordered() {
    let gen = SequentialIdGen::new("t");
    let a = gen.next_task_id();
    let b = gen.next_task_id();
    assert_eq!(a, "task_t-000001");
    assert_eq!(b, "task_t-000002");
}

#[test]
fn id_kind_prefixes_differ() {
    let gen = SequentialIdGen::new("x");
    assert!(gen.next_task_id().starts_with("task_"));
    assert!(gen.next_event_id().starts_with("ev_"));
    assert!(gen.next_artifact_id().starts_with("art_"));
}

define_id! {
    pub struct TestId;
}

#[test]
fn define_id_macro_generates_expected_impls() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.short(2), "ab");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id, "abc");
    let from_str: TestId = "xyz".into();
    assert_eq!(from_str.as_str(), "xyz");
}
