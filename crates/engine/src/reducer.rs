//! `apply_event(snapshot, event) -> snapshot`: the pure function shared
//! by the write path and the rebuild path (spec §4.6), grounded on the
//! teacher's `MaterializedState::apply_event` match-per-event-type
//! shape. Every arm here must be idempotent under re-application, the
//! same invariant the teacher's own doc comment states.

use lattice_core::event::{Event, FieldUpdatedData, StatusChangedData};
use lattice_core::task::{Comment, EvidenceRef, EvidenceSourceType, RelationshipRecord, Task};
use lattice_core::{Config, Priority, Urgency};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct TaskCreatedData {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    task_type: String,
    priority: Priority,
    urgency: Urgency,
    #[serde(default)]
    complexity: Option<lattice_core::task::Complexity>,
    #[serde(default)]
    assigned_to: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    custom_fields: std::collections::BTreeMap<String, Value>,
    #[serde(default)]
    short_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssignmentChangedData {
    assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    id: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtifactAttachedData {
    artifact_id: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    target_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    note: Option<String>,
}

/// Applies one event to a snapshot, returning the new snapshot.
/// `config` supplies the status order (for `reopened_count`) and the
/// done-class status set; the reducer itself never reads the Clock —
/// all times derive from `event.ts`.
pub fn apply_event(mut task: Option<Task>, event: &Event, config: &Config) -> Option<Task> {
    match event.kind.as_str() {
        "task_created" => {
            let data: TaskCreatedData = match serde_json::from_value(event.data.clone()) {
                Ok(d) => d,
                Err(_) => return task,
            };
            Some(Task {
                id: event.task_id.clone(),
                short_id: data.short_id,
                title: data.title,
                description: data.description,
                status: config.default_status.clone(),
                task_type: data.task_type,
                priority: data.priority,
                urgency: data.urgency,
                complexity: data.complexity,
                assigned_to: data.assigned_to,
                tags: data.tags,
                custom_fields: data.custom_fields,
                relationships_out: Vec::new(),
                evidence_refs: Vec::new(),
                comments: Vec::new(),
                comment_count: 0,
                reopened_count: 0,
                created_at: event.ts,
                updated_at: event.ts,
                done_at: None,
                archived: false,
                provenance: provenance_from_event(event),
            })
        }
        "status_changed" => {
            let Some(mut t) = task.take() else { return None };
            let Ok(data) = serde_json::from_value::<StatusChangedData>(event.data.clone()) else {
                return Some(t);
            };
            let old_idx = config.statuses.iter().position(|s| s == &data.from);
            let new_idx = config.statuses.iter().position(|s| s == &data.to);
            if let (Some(old), Some(new)) = (old_idx, new_idx) {
                if new < old {
                    t.reopened_count += 1;
                }
            }
            let entering_done = is_done_class(&data.to);
            t.status = data.to;
            if entering_done {
                t.done_at = Some(event.ts);
            } else {
                t.done_at = None;
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "assignment_changed" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<AssignmentChangedData>(event.data.clone()) {
                t.assigned_to = data.assigned_to;
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "field_updated" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<FieldUpdatedData>(event.data.clone()) {
                apply_field_update(&mut t, &data);
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "comment_added" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<CommentData>(event.data.clone()) {
                if !t.comments.iter().any(|c| c.id == data.id) {
                    t.comments.push(Comment {
                        id: data.id.clone(),
                        actor: event.actor.as_str().to_string(),
                        body: data.body,
                        role: data.role.clone(),
                        created_at: event.ts,
                        deleted: false,
                    });
                    t.comment_count += 1;
                    if let Some(role) = data.role {
                        insert_evidence(
                            &mut t,
                            EvidenceRef {
                                source_type: EvidenceSourceType::Comment,
                                source_id: data.id,
                                role: Some(role),
                            },
                        );
                    }
                }
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "comment_edited" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<CommentData>(event.data.clone()) {
                if let Some(c) = t.comments.iter_mut().find(|c| c.id == data.id) {
                    c.body = data.body;
                }
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "comment_deleted" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<CommentData>(event.data.clone()) {
                let role = t
                    .comments
                    .iter()
                    .find(|c| c.id == data.id)
                    .and_then(|c| c.role.clone());
                if let Some(c) = t.comments.iter_mut().find(|c| c.id == data.id) {
                    if !c.deleted {
                        c.deleted = true;
                    }
                }
                if let Some(role) = role {
                    t.evidence_refs.retain(|e| {
                        e.key() != (EvidenceSourceType::Comment, data.id.as_str(), Some(role.as_str()))
                    });
                }
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "artifact_attached" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<ArtifactAttachedData>(event.data.clone()) {
                insert_evidence(
                    &mut t,
                    EvidenceRef {
                        source_type: EvidenceSourceType::Artifact,
                        source_id: data.artifact_id,
                        role: data.role,
                    },
                );
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "relationship_added" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<RelationshipData>(event.data.clone()) {
                if data.target_id != t.id {
                    let record = RelationshipRecord {
                        target_id: data.target_id,
                        kind: data.kind,
                        note: data.note,
                    };
                    if !t.relationships_out.iter().any(|r| r.key() == record.key()) {
                        t.relationships_out.push(record);
                    }
                }
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "relationship_removed" => {
            let Some(mut t) = task.take() else { return None };
            if let Ok(data) = serde_json::from_value::<RelationshipData>(event.data.clone()) {
                t.relationships_out
                    .retain(|r| r.key() != (data.target_id.as_str(), data.kind.as_str()));
            }
            t.updated_at = event.ts;
            Some(t)
        }
        "task_archived" => {
            let Some(mut t) = task.take() else { return None };
            t.archived = true;
            t.updated_at = event.ts;
            Some(t)
        }
        "task_unarchived" => {
            let Some(mut t) = task.take() else { return None };
            t.archived = false;
            t.updated_at = event.ts;
            Some(t)
        }
        _ => {
            // Unknown (including x_*) event types bump updated_at only.
            if let Some(mut t) = task.take() {
                t.updated_at = event.ts;
                Some(t)
            } else {
                None
            }
        }
    }
}

fn is_done_class(status: &str) -> bool {
    status == "done" || status == "cancelled"
}

fn insert_evidence(task: &mut Task, evidence: EvidenceRef) {
    if !task.evidence_refs.iter().any(|e| e.key() == evidence.key()) {
        task.evidence_refs.push(evidence);
    }
}

fn apply_field_update(task: &mut Task, data: &FieldUpdatedData) {
    if lattice_core::event::is_protected_field(&data.path) {
        return;
    }
    match data.path.first().map(String::as_str) {
        Some("title") => {
            if let Some(s) = data.value.as_str() {
                task.title = s.to_string();
            }
        }
        Some("description") => {
            if let Some(s) = data.value.as_str() {
                task.description = s.to_string();
            }
        }
        Some("priority") => {
            if let Ok(p) = serde_json::from_value::<Priority>(data.value.clone()) {
                task.priority = p;
            }
        }
        Some("urgency") => {
            if let Ok(u) = serde_json::from_value::<Urgency>(data.value.clone()) {
                task.urgency = u;
            }
        }
        Some("complexity") => {
            if let Ok(c) = serde_json::from_value(data.value.clone()) {
                task.complexity = c;
            }
        }
        Some("tags") => {
            if let Ok(tags) = serde_json::from_value(data.value.clone()) {
                task.tags = tags;
            }
        }
        Some("custom_fields") if data.path.len() == 2 => {
            task.custom_fields
                .insert(data.path[1].clone(), data.value.clone());
        }
        _ => {}
    }
}

fn provenance_from_event(event: &Event) -> lattice_core::task::Provenance {
    match &event.provenance {
        Some(p) => lattice_core::task::Provenance {
            triggered_by: p.triggered_by.clone(),
            on_behalf_of: p.on_behalf_of.clone(),
            reason: p.reason.clone(),
        },
        None => lattice_core::task::Provenance::default(),
    }
}

#[cfg(test)]
#[path = "reducer_tests.rs"]
mod tests;
