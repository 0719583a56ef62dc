//! The `Task` snapshot — a derived, denormalized view of a task's current
//! state, rebuilt by replaying its event log through the reducer
//! (spec §3, §4.6). Mirrors the way the teacher's `Job` struct in
//! `crates/core/src/job.rs` is a pure replay target with no independent
//! state of its own.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    High,
    Normal,
    Low,
}

impl Urgency {
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Immediate => 0,
            Urgency::High => 1,
            Urgency::Normal => 2,
            Urgency::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSourceType {
    Comment,
    Artifact,
}

/// A pointer from a task to a role-bearing comment or artifact that
/// satisfies a completion-policy role (spec glossary: "Evidence ref").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub source_type: EvidenceSourceType,
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl EvidenceRef {
    /// Identity key for set-under-(source_type, source_id, role) semantics.
    pub fn key(&self) -> (EvidenceSourceType, &str, Option<&str>) {
        (self.source_type, &self.source_id, self.role.as_deref())
    }
}

/// An outgoing relationship edge, e.g. `(blocks, PROJ-2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub target_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RelationshipRecord {
    /// Identity key for set-under-(target_id, type) semantics.
    pub fn key(&self) -> (&str, &str) {
        (&self.target_id, &self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A comment attached to a task. Comments are stored inline on the
/// snapshot (spec's `comment_count` is derived from this list's length
/// minus deletions); the event log remains the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub actor: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
}

/// Derived, denormalized snapshot of a task's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub priority: Priority,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub relationships_out: Vec<RelationshipRecord>,
    #[serde(default)]
    pub evidence_refs: Vec<EvidenceRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub comment_count: u64,
    #[serde(default)]
    pub reopened_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Task {
    pub fn has_relationship(&self, target_id: &str, kind: &str) -> bool {
        self.relationships_out
            .iter()
            .any(|r| r.target_id == target_id && r.kind == kind)
    }

    pub fn has_evidence(&self, source_type: EvidenceSourceType, source_id: &str, role: Option<&str>) -> bool {
        self.evidence_refs
            .iter()
            .any(|e| e.key() == (source_type, source_id, role))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.evidence_refs
            .iter()
            .any(|e| e.role.as_deref() == Some(role))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
