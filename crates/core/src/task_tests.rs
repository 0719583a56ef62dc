use super::*;
use chrono::TimeZone;

fn sample_task() -> Task {
    let now = Utc.timestamp_millis_opt(0).single().unwrap();
    Task {
        id: "task_01".into(),
        short_id: None,
        title: "A".into(),
        description: String::new(),
        status: "backlog".into(),
        task_type: "task".into(),
        priority: Priority::High,
        urgency: Urgency::Normal,
        complexity: None,
        assigned_to: None,
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
        provenance: Provenance::default(),
    }
}

#[test]
fn priority_and_urgency_rank_ordering() {
    assert!(Priority::Critical.rank() < Priority::Low.rank());
    assert!(Urgency::Immediate.rank() < Urgency::Low.rank());
}

#[test]
fn has_relationship_checks_target_and_type() {
    let mut task = sample_task();
    task.relationships_out.push(RelationshipRecord {
        target_id: "task_02".into(),
        kind: "blocks".into(),
        note: None,
    });
    assert!(task.has_relationship("task_02", "blocks"));
    assert!(!task.has_relationship("task_02", "relates_to"));
}

#[test]
fn has_role_scans_evidence_refs() {
    let mut task = sample_task();
    task.evidence_refs.push(EvidenceRef {
        source_type: EvidenceSourceType::Comment,
        source_id: "c1".into(),
        role: Some("review".into()),
    });
    assert!(task.has_role("review"));
    assert!(!task.has_role("qa"));
}
