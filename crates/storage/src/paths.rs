//! Project root discovery and the fixed on-disk directory layout
//! (spec §4.4/§6).

use std::env;
use std::path::{Path, PathBuf};

use lattice_core::{ErrorCode, LatticeError};

pub const STATE_DIR_NAME: &str = ".lattice";
pub const ROOT_ENV_VAR: &str = "LATTICE_ROOT";

/// Resolved absolute paths under a discovered `.lattice/` state directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walks upward from `start` looking for a `.lattice/` directory,
    /// honoring the `LATTICE_ROOT` environment override first.
    pub fn discover(start: &Path) -> Result<Self, LatticeError> {
        if let Ok(override_root) = env::var(ROOT_ENV_VAR) {
            let candidate = PathBuf::from(override_root);
            if candidate.is_dir() {
                return Ok(Self::new(candidate));
            }
            return Err(LatticeError::not_initialized(format!(
                "{ROOT_ENV_VAR} is set to {candidate:?}, which is not a directory"
            )));
        }

        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(STATE_DIR_NAME);
            if candidate.is_dir() {
                return Ok(Self::new(candidate));
            }
            if !current.pop() {
                return Err(LatticeError::new(
                    ErrorCode::NotInitialized,
                    format!(
                        "no {STATE_DIR_NAME} directory found walking up from {}",
                        start.display()
                    ),
                ));
            }
        }
    }

    /// Creates a fresh `.lattice/` layout at `root` (used by `lattice init`).
    pub fn init(root: &Path) -> Result<Self, LatticeError> {
        let state_dir = root.join(STATE_DIR_NAME);
        for sub in [
            "tasks",
            "events",
            "artifacts/meta",
            "artifacts/payload",
            "notes",
            "plans",
            "archive/tasks",
            "archive/events",
            "archive/notes",
            "locks",
        ] {
            std::fs::create_dir_all(state_dir.join(sub)).map_err(|e| {
                LatticeError::integrity_error(format!("failed to create {sub}: {e}"))
            })?;
        }
        Ok(Self::new(state_dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn task_snapshot(&self, task_id: &str) -> PathBuf {
        self.root.join("tasks").join(format!("{task_id}.json"))
    }

    pub fn task_events(&self, task_id: &str) -> PathBuf {
        self.root.join("events").join(format!("{task_id}.jsonl"))
    }

    pub fn lifecycle_log(&self) -> PathBuf {
        self.root.join("events").join("_lifecycle.jsonl")
    }

    pub fn artifact_meta(&self, artifact_id: &str) -> PathBuf {
        self.root
            .join("artifacts/meta")
            .join(format!("{artifact_id}.json"))
    }

    pub fn artifact_payload(&self, artifact_id: &str, ext: &str) -> PathBuf {
        let filename = if ext.is_empty() {
            artifact_id.to_string()
        } else {
            format!("{artifact_id}.{ext}")
        };
        self.root.join("artifacts/payload").join(filename)
    }

    pub fn note(&self, task_id: &str) -> PathBuf {
        self.root.join("notes").join(format!("{task_id}.md"))
    }

    pub fn plan(&self, task_id: &str) -> PathBuf {
        self.root.join("plans").join(format!("{task_id}.md"))
    }

    pub fn archived_task_snapshot(&self, task_id: &str) -> PathBuf {
        self.root
            .join("archive/tasks")
            .join(format!("{task_id}.json"))
    }

    pub fn archived_task_events(&self, task_id: &str) -> PathBuf {
        self.root
            .join("archive/events")
            .join(format!("{task_id}.jsonl"))
    }

    pub fn ids_index(&self) -> PathBuf {
        self.root.join("ids.json")
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    pub fn lock_path_for(&self, resource: &str) -> PathBuf {
        self.locks_dir().join(format!("{resource}.lock"))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
