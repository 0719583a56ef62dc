use super::*;
use lattice_core::Actor;
use serde_json::json;
use tempfile::tempdir;

fn sample_event(id: &str, task_id: &str, value: i64) -> Event {
    Event {
        id: id.to_string(),
        kind: "x_test".to_string(),
        task_id: task_id.to_string(),
        actor: Actor::parse("human:alice").unwrap(),
        ts: chrono::Utc::now(),
        data: json!({"n": value}),
        provenance: None,
        telemetry: None,
    }
}

#[test]
fn append_then_iterate_round_trips() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let log = EventLog::new(&paths);

    let outcome = log.append(sample_event("ev_1", "task_1", 1)).unwrap();
    assert!(matches!(outcome, AppendOutcome::Appended(_)));

    let (events, corrupt) = log.iterate("task_1").unwrap();
    assert_eq!(events.len(), 1);
    assert!(!corrupt);
}

#[test]
fn append_same_id_same_payload_is_idempotent() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let log = EventLog::new(&paths);

    log.append(sample_event("ev_1", "task_1", 1)).unwrap();
    let outcome = log.append(sample_event("ev_1", "task_1", 1)).unwrap();
    assert!(matches!(outcome, AppendOutcome::AlreadyApplied(_)));

    let (events, _) = log.iterate("task_1").unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn append_same_id_different_payload_conflicts() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let log = EventLog::new(&paths);

    log.append(sample_event("ev_1", "task_1", 1)).unwrap();
    let err = log.append(sample_event("ev_1", "task_1", 2)).unwrap_err();
    assert!(matches!(err, EventLogError::Conflict { .. }));
}
