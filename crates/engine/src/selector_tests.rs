use super::*;
use lattice_core::{Priority, Urgency};

fn task(id: &str, status: &str, priority: Priority, assigned_to: Option<&str>) -> Task {
    let now = chrono::Utc::now();
    Task {
        id: id.to_string(),
        short_id: None,
        title: "t".into(),
        description: String::new(),
        status: status.to_string(),
        task_type: "task".into(),
        priority,
        urgency: Urgency::Normal,
        complexity: None,
        assigned_to: assigned_to.map(String::from),
        tags: vec![],
        custom_fields: Default::default(),
        relationships_out: vec![],
        evidence_refs: vec![],
        comments: vec![],
        comment_count: 0,
        reopened_count: 0,
        created_at: now,
        updated_at: now,
        done_at: None,
        archived: false,
        provenance: Default::default(),
    }
}

#[test]
fn next_picks_highest_priority_in_ready_pool() {
    let tasks = vec![
        task("task_b", "backlog", Priority::Low, None),
        task("task_a", "backlog", Priority::Critical, None),
    ];
    let picked = next(&tasks, None, None).unwrap();
    assert_eq!(picked.id, "task_a");
}

#[test]
fn next_prefers_resume_set_for_actor() {
    let tasks = vec![
        task("task_a", "backlog", Priority::Critical, None),
        task("task_b", "in_progress", Priority::Low, Some("agent:a")),
    ];
    let picked = next(&tasks, Some("agent:a"), None).unwrap();
    assert_eq!(picked.id, "task_b");
}

#[test]
fn next_excludes_tasks_assigned_to_others() {
    let tasks = vec![task("task_a", "backlog", Priority::High, Some("agent:b"))];
    assert!(next(&tasks, Some("agent:a"), None).is_none());
}

#[test]
fn next_is_deterministic_across_repeated_calls() {
    let tasks = vec![
        task("task_a", "backlog", Priority::High, None),
        task("task_b", "backlog", Priority::High, None),
    ];
    let first = next(&tasks, None, None).map(|t| t.id.clone());
    let second = next(&tasks, None, None).map(|t| t.id.clone());
    assert_eq!(first, second);
}
