use super::*;
use lattice_core::Actor;
use serde_json::json;

fn event(kind: &str, task_id: &str, data: Value, ts_ms: i64) -> Event {
    Event {
        id: format!("ev_{ts_ms}"),
        kind: kind.to_string(),
        task_id: task_id.to_string(),
        actor: Actor::parse("human:alice").unwrap(),
        ts: chrono::DateTime::from_timestamp_millis(ts_ms).unwrap(),
        data,
        provenance: None,
        telemetry: None,
    }
}

#[test]
fn task_created_initializes_snapshot() {
    let config = Config::default();
    let ev = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &ev, &config).unwrap();
    assert_eq!(task.title, "A");
    assert_eq!(task.status, "backlog");
    assert_eq!(task.comment_count, 0);
    assert_eq!(task.created_at, ev.ts);
    assert_eq!(task.updated_at, ev.ts);
}

#[test]
fn status_changed_sets_done_at_on_terminal_entry() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let status_ev = event(
        "status_changed",
        "task_1",
        json!({"from": "backlog", "to": "done"}),
        2000,
    );
    let task = apply_event(task, &status_ev, &config).unwrap();
    assert_eq!(task.status, "done");
    assert_eq!(task.done_at, Some(status_ev.ts));
}

#[test]
fn status_changed_increments_reopened_count_on_regression() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let mut task = apply_event(None, &created, &config);
    for (from, to, ts) in [
        ("backlog", "planned", 2000),
        ("planned", "in_planning", 3000),
        ("in_planning", "backlog", 4000),
    ] {
        let ev = event("status_changed", "task_1", json!({"from": from, "to": to}), ts);
        task = apply_event(task, &ev, &config);
    }
    assert_eq!(task.unwrap().reopened_count, 1);
}

#[test]
fn relationship_added_rejects_self_link() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let ev = event(
        "relationship_added",
        "task_1",
        json!({"target_id": "task_1", "type": "blocks"}),
        2000,
    );
    let task = apply_event(task, &ev, &config).unwrap();
    assert!(task.relationships_out.is_empty());
}

#[test]
fn comment_added_with_role_creates_evidence_ref() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let ev = event(
        "comment_added",
        "task_1",
        json!({"id": "c1", "body": "ok", "role": "review"}),
        2000,
    );
    let task = apply_event(task, &ev, &config).unwrap();
    assert_eq!(task.comment_count, 1);
    assert!(task.has_role("review"));
}

#[test]
fn comment_deleted_removes_evidence_ref() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let add = event(
        "comment_added",
        "task_1",
        json!({"id": "c1", "body": "ok", "role": "review"}),
        2000,
    );
    let task = apply_event(task, &add, &config);
    let delete = event("comment_deleted", "task_1", json!({"id": "c1"}), 3000);
    let task = apply_event(task, &delete, &config).unwrap();
    assert!(!task.has_role("review"));
}

#[test]
fn unknown_event_type_only_bumps_updated_at() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let custom = event("x_deploy_started", "task_1", json!({"env": "prod"}), 2000);
    let task = apply_event(task, &custom, &config).unwrap();
    assert_eq!(task.title, "A");
    assert_eq!(task.updated_at, custom.ts);
}

#[test]
fn field_updated_rejects_protected_fields() {
    let config = Config::default();
    let created = event(
        "task_created",
        "task_1",
        json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
        1000,
    );
    let task = apply_event(None, &created, &config);
    let ev = event(
        "field_updated",
        "task_1",
        json!({"path": ["status"], "value": "done", "previous_value": "backlog"}),
        2000,
    );
    let task = apply_event(task, &ev, &config).unwrap();
    assert_eq!(task.status, "backlog");
}

#[test]
fn replay_from_scratch_matches_incremental_application() {
    let config = Config::default();
    let events = vec![
        event(
            "task_created",
            "task_1",
            json!({"title": "A", "type": "task", "priority": "high", "urgency": "normal"}),
            1000,
        ),
        event(
            "assignment_changed",
            "task_1",
            json!({"assigned_to": "agent:claude"}),
            2000,
        ),
        event(
            "status_changed",
            "task_1",
            json!({"from": "backlog", "to": "planned"}),
            3000,
        ),
    ];

    let mut incremental: Option<Task> = None;
    for ev in &events {
        incremental = apply_event(incremental, ev, &config);
    }

    let mut replayed: Option<Task> = None;
    for ev in &events {
        replayed = apply_event(replayed, ev, &config);
    }

    let incremental = incremental.unwrap();
    let replayed = replayed.unwrap();
    assert_eq!(incremental.status, replayed.status);
    assert_eq!(incremental.assigned_to, replayed.assigned_to);
    assert_eq!(incremental.updated_at, replayed.updated_at);
}
