//! The recovery primitives: `rebuild` (replay) and `doctor` (scan)
//! (spec §4.10).

use std::collections::{BTreeSet, HashSet};

use lattice_core::task::Task;
use lattice_core::{Config, LatticeError};
use lattice_core::EvidenceSourceType;
use lattice_storage::{ArtifactStore, EventLog, ProjectPaths, ShortIdIndex};
use serde::Serialize;
use tracing::info;

use crate::reducer;

/// Rebuilds one task's snapshot from its event log, writing the result
/// atomically. All derived times come from the events themselves, so
/// this is fully deterministic given a stable log (spec §4.10).
pub fn rebuild_task(
    paths: &ProjectPaths,
    config: &Config,
    task_id: &str,
) -> Result<Option<Task>, LatticeError> {
    let log = EventLog::new(paths);
    let (events, _corrupt) = log.iterate(task_id).map_err(LatticeError::from)?;

    let mut snapshot: Option<Task> = None;
    for event in &events {
        snapshot = reducer::apply_event(snapshot, event, config);
    }

    if let Some(task) = &snapshot {
        lattice_storage::store::write_snapshot_atomic(&paths.task_snapshot(task_id), task)
            .map_err(|e| LatticeError::integrity_error(e.to_string()))?;
    }

    Ok(snapshot)
}

#[derive(Debug, Default, Serialize)]
pub struct RebuildReport {
    pub tasks_rebuilt: usize,
    pub lifecycle_events: usize,
    pub short_ids_assigned: usize,
}

/// Rebuilds every task snapshot, then regenerates the lifecycle index
/// and the short-ID index from scratch (spec §4.10).
pub fn rebuild_all(paths: &ProjectPaths, config: &Config, task_ids: &[String]) -> Result<RebuildReport, LatticeError> {
    let mut report = RebuildReport::default();
    let mut created_events = Vec::new();

    for task_id in task_ids {
        if rebuild_task(paths, config, task_id)?.is_some() {
            report.tasks_rebuilt += 1;
        }
        let log = EventLog::new(paths);
        let (events, _) = log.iterate(task_id).map_err(LatticeError::from)?;
        for event in events {
            if event.is_lifecycle() {
                created_events.push(event);
            }
        }
    }

    created_events.sort_by(|a, b| a.ts.cmp(&b.ts).then_with(|| a.id.cmp(&b.id)));
    report.lifecycle_events = created_events.len();

    let lifecycle_path = paths.lifecycle_log();
    let _ = std::fs::remove_file(&lifecycle_path);
    for event in &created_events {
        lattice_storage::store::append_jsonl_line(&lifecycle_path, event)
            .map_err(|e| LatticeError::integrity_error(e.to_string()))?;
    }

    let mut created_order: Vec<(chrono::DateTime<chrono::Utc>, String)> = created_events
        .iter()
        .filter(|e| e.kind == "task_created")
        .map(|e| (e.ts, e.task_id.clone()))
        .collect();
    created_order.sort();
    let ordered_ids: Vec<String> = created_order.into_iter().map(|(_, id)| id).collect();

    let short_ids = ShortIdIndex::new(paths);
    let project_code = config.project_code.clone().unwrap_or_else(|| "TASK".to_string());
    let data = short_ids
        .rebuild_from(&project_code, &ordered_ids)
        .map_err(LatticeError::from)?;
    report.short_ids_assigned = data.map.len();

    info!(tasks_rebuilt = report.tasks_rebuilt, "rebuild_all complete");
    Ok(report)
}

#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    pub corrupt_logs: Vec<String>,
    pub snapshot_drift: Vec<String>,
    pub dangling_relationships: Vec<String>,
    pub missing_artifact_payloads: Vec<String>,
    pub self_links: Vec<String>,
    pub duplicate_edges: Vec<String>,
    pub unknown_event_types: Vec<String>,
    pub lifecycle_disagreement: Vec<String>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt_logs.is_empty()
            && self.snapshot_drift.is_empty()
            && self.dangling_relationships.is_empty()
            && self.missing_artifact_payloads.is_empty()
            && self.self_links.is_empty()
            && self.duplicate_edges.is_empty()
            && self.unknown_event_types.is_empty()
            && self.lifecycle_disagreement.is_empty()
    }
}

/// Scans the store for drift and corruption without necessarily fixing
/// it (`fix` drives whether corrupt trailing lines get truncated).
pub fn doctor(paths: &ProjectPaths, config: &Config, task_ids: &[String], fix: bool) -> Result<DoctorReport, LatticeError> {
    let mut report = DoctorReport::default();
    let all_ids: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
    let log = EventLog::new(paths);

    for task_id in task_ids {
        let (events, corrupt) = log.iterate(task_id).map_err(LatticeError::from)?;
        if corrupt {
            report.corrupt_logs.push(task_id.clone());
            if fix {
                truncate_corrupt_tail(&paths.task_events(task_id));
            }
        }

        let mut replayed: Option<Task> = None;
        for event in &events {
            replayed = reducer::apply_event(replayed, event, config);
            let known = lattice_core::event::Event::is_reserved_type(&event.kind)
                || lattice_core::event::Event::is_extension_type(&event.kind);
            if !known {
                report.unknown_event_types.push(format!("{task_id}:{}", event.kind));
            }
        }

        let on_disk: Option<Task> =
            lattice_storage::store::read_snapshot(&paths.task_snapshot(task_id))
                .map_err(|e| LatticeError::integrity_error(e.to_string()))?;

        match (&replayed, &on_disk) {
            (Some(r), Some(d)) => {
                let r_json = serde_json::to_string(r).unwrap_or_default();
                let d_json = serde_json::to_string(d).unwrap_or_default();
                if r_json != d_json {
                    report.snapshot_drift.push(task_id.clone());
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                report.snapshot_drift.push(task_id.clone());
            }
            (None, None) => {}
        }

        if let Some(task) = &replayed {
            let mut seen_edges: BTreeSet<(&str, &str)> = BTreeSet::new();
            for rel in &task.relationships_out {
                if rel.target_id == task.id {
                    report.self_links.push(task_id.clone());
                }
                if !all_ids.contains(rel.target_id.as_str()) {
                    report.dangling_relationships.push(format!("{task_id}->{}", rel.target_id));
                }
                let key = rel.key();
                if !seen_edges.insert(key) {
                    report.duplicate_edges.push(format!("{task_id}->{}:{}", rel.target_id, rel.kind));
                }
            }

            let artifacts = ArtifactStore::new(paths);
            for evidence in &task.evidence_refs {
                if evidence.source_type != EvidenceSourceType::Artifact {
                    continue;
                }
                let artifact_id = &evidence.source_id;
                let meta = artifacts
                    .meta(artifact_id)
                    .map_err(|e| LatticeError::integrity_error(e.to_string()))?;
                let Some(artifact) = meta else {
                    report.missing_artifact_payloads.push(format!("{task_id}:{artifact_id}"));
                    continue;
                };
                if let Some(payload_path) = artifacts.payload_path(&artifact) {
                    if !payload_path.exists() {
                        report.missing_artifact_payloads.push(format!("{task_id}:{artifact_id}"));
                    }
                }
            }
        }
    }

    let (primary, _) = log.iterate_lifecycle().map_err(LatticeError::from)?;
    let mut derived = Vec::new();
    for task_id in task_ids {
        let (events, _) = log.iterate(task_id).map_err(LatticeError::from)?;
        derived.extend(events.into_iter().filter(|e| e.is_lifecycle()));
    }
    if primary.len() != derived.len() {
        report.lifecycle_disagreement.push(format!(
            "lifecycle index has {} entries, per-task logs imply {}",
            primary.len(),
            derived.len()
        ));
    }

    Ok(report)
}

fn truncate_corrupt_tail(path: &std::path::Path) {
    if let Ok(contents) = std::fs::read_to_string(path) {
        let mut lines: Vec<&str> = contents.lines().collect();
        while let Some(last) = lines.last() {
            if serde_json::from_str::<serde_json::Value>(last).is_err() {
                lines.pop();
            } else {
                break;
            }
        }
        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = std::fs::write(path, out);
    }
}

#[cfg(test)]
#[path = "integrity_tests.rs"]
mod tests;
