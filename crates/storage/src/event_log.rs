//! Per-task append-only event logs plus the derived lifecycle index
//! (spec §4.5). Schema validation is serde deserialization itself;
//! idempotency is resolved by comparing the caller-supplied ID against
//! what's already on disk.

use std::path::Path;

use lattice_core::clock::Clock;
use lattice_core::event::Event;
use lattice_core::{ErrorCode, LatticeError};
use thiserror::Error;

use crate::paths::ProjectPaths;
use crate::store::{self, StoreError};

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("event {id} already exists with a different payload")]
    Conflict { id: String },
}

impl From<EventLogError> for LatticeError {
    fn from(err: EventLogError) -> Self {
        match err {
            EventLogError::Conflict { id } => LatticeError::conflict(format!(
                "event {id} was already appended with a different payload"
            )),
            EventLogError::Store(e) => {
                LatticeError::new(ErrorCode::IntegrityError, e.to_string())
            }
        }
    }
}

/// Outcome of an `append` call, distinguishing a fresh write from an
/// idempotent no-op replay of the same caller-supplied ID.
pub enum AppendOutcome {
    Appended(Event),
    AlreadyApplied(Event),
}

pub struct EventLog<'a> {
    paths: &'a ProjectPaths,
}

impl<'a> EventLog<'a> {
    pub fn new(paths: &'a ProjectPaths) -> Self {
        Self { paths }
    }

    fn log_path(&self, task_id: &str) -> std::path::PathBuf {
        self.paths.task_events(task_id)
    }

    /// Appends `event` to its task's log, honoring caller-supplied-ID
    /// idempotency: if an event with the same ID already exists and its
    /// payload is byte-equal (ignoring provenance), this is a no-op
    /// success; if the payload differs, this is a `CONFLICT`.
    pub fn append(&self, event: Event) -> Result<AppendOutcome, EventLogError> {
        let path = self.log_path(&event.task_id);
        let (existing, _corrupt) = store::read_jsonl::<Event>(&path)?;

        if let Some(prior) = existing.iter().find(|e| e.id == event.id) {
            return if prior.payload_equivalent(&event) {
                Ok(AppendOutcome::AlreadyApplied(prior.clone()))
            } else {
                Err(EventLogError::Conflict {
                    id: event.id.clone(),
                })
            };
        }

        store::append_jsonl_line(&path, &event)?;
        Ok(AppendOutcome::Appended(event))
    }

    /// Appends to the global lifecycle index; callers check
    /// `Event::is_lifecycle` before calling this.
    pub fn append_lifecycle(&self, event: &Event) -> Result<(), EventLogError> {
        store::append_jsonl_line(&self.paths.lifecycle_log(), event)?;
        Ok(())
    }

    /// Yields all events for a task in file (== append == timestamp)
    /// order. The `bool` flags a tolerated corrupt trailing line.
    pub fn iterate(&self, task_id: &str) -> Result<(Vec<Event>, bool), EventLogError> {
        let path = self.log_path(task_id);
        Ok(store::read_jsonl::<Event>(&path)?)
    }

    pub fn iterate_lifecycle(&self) -> Result<(Vec<Event>, bool), EventLogError> {
        Ok(store::read_jsonl::<Event>(&self.paths.lifecycle_log())?)
    }

    pub fn exists(&self, task_id: &str) -> bool {
        self.log_path(task_id).exists()
    }
}

/// Reads the Clock, bumping it by 1ms if the raw reading would not be
/// strictly after `last` (spec §4.5's monotonicity guarantee), used by
/// callers constructing the next event's timestamp.
pub fn next_timestamp(clock: &dyn Clock, last: Option<chrono::DateTime<chrono::Utc>>) -> chrono::DateTime<chrono::Utc> {
    let raw = clock.now();
    match last {
        Some(prev) if raw <= prev => prev + chrono::Duration::milliseconds(1),
        _ => raw,
    }
}

pub fn archive_log(src: &Path, dst: &Path) -> Result<(), StoreError> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: dst.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::rename(src, dst).map_err(|e| StoreError::Io {
        path: dst.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
