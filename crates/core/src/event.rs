//! The `Event` envelope and its built-in payload variants (spec §3/§4.5).
//!
//! Events are immutable once written; the on-disk representation is one
//! compact JSON object per line (`events/<task_id>.jsonl`), tagged by
//! `type` the way the teacher's `Event` enum is tagged in
//! `crates/core/src/event.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actor::Actor;

pub const LIFECYCLE_EVENT_TYPES: [&str; 3] =
    ["task_created", "task_archived", "task_unarchived"];

pub const RESERVED_EVENT_TYPES: [&str; 12] = [
    "task_created",
    "status_changed",
    "assignment_changed",
    "field_updated",
    "comment_added",
    "comment_edited",
    "comment_deleted",
    "relationship_added",
    "relationship_removed",
    "artifact_attached",
    "task_archived",
    "task_unarchived",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Provenance {
    pub fn is_empty(&self) -> bool {
        self.triggered_by.is_none() && self.on_behalf_of.is_none() && self.reason.is_none()
    }
}

/// One immutable record in a task's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub task_id: String,
    pub actor: Actor,
    pub ts: DateTime<Utc>,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<Value>,
}

impl Event {
    pub fn is_lifecycle(&self) -> bool {
        LIFECYCLE_EVENT_TYPES.contains(&self.kind.as_str())
    }

    pub fn is_reserved_type(kind: &str) -> bool {
        RESERVED_EVENT_TYPES.contains(&kind)
    }

    pub fn is_extension_type(kind: &str) -> bool {
        kind.starts_with("x_")
    }

    /// Byte-equal-except-provenance comparison, used for idempotency
    /// checks on caller-supplied event IDs (spec §4.5).
    pub fn payload_equivalent(&self, other: &Event) -> bool {
        self.kind == other.kind && self.task_id == other.task_id && self.data == other.data
    }
}

/// Payload of a `status_changed` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced: bool,
}

/// Payload of a `field_updated` event. `previous_value` is always
/// populated (see SPEC_FULL.md's resolution of the open question on
/// reversibility).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldUpdatedData {
    pub path: Vec<String>,
    pub value: Value,
    pub previous_value: Option<Value>,
}

/// A small set of fields the generic `field_updated` path refuses to
/// touch, forcing callers through dedicated events instead.
pub const PROTECTED_FIELDS: [&str; 8] = [
    "id",
    "status",
    "created_at",
    "updated_at",
    "evidence_refs",
    "relationships_out",
    "comment_count",
    "archived",
];

pub fn is_protected_field(path: &[String]) -> bool {
    path.first()
        .map(|first| PROTECTED_FIELDS.contains(&first.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
