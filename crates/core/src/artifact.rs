//! Artifact metadata records (spec §3/§4.11). The payload itself lives
//! under `artifacts/payload/` (files) or is referenced by URL; this
//! struct is the sidecar `artifacts/meta/<id>.json` document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSource {
    File,
    Url,
    Conversation,
    Prompt,
    Log,
    Reference,
}

impl ArtifactSource {
    /// File-backed sources are copied into the store; the rest are
    /// stored by reference only.
    pub fn is_file_backed(self) -> bool {
        matches!(self, ArtifactSource::File)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub task_id: String,
    pub source: ArtifactSource,
    pub payload_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub actor: String,
    /// sha-256 of the payload at write time, used by `doctor` to detect
    /// out-of-band edits or truncation (see SPEC_FULL.md's resolution of
    /// "content-addressed" as a fingerprint, not a CAS path scheme).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_sha256: Option<String>,
}
