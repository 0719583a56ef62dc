//! Orchestrates `Workflow` + `Reducer` + `EventLog` + `Store` for every
//! mutation verb (spec §4.8): lock → load-or-rebuild → validate →
//! append → apply → persist → lifecycle append → hooks → release.

use std::collections::BTreeMap;
use std::sync::Arc;

use lattice_core::clock::Clock;
use lattice_core::event::{Event, FieldUpdatedData, Provenance as EventProvenance, StatusChangedData};
use lattice_core::id::IdGen;
use lattice_core::task::Task;
use lattice_core::{Actor, Config, LatticeError, Priority, Urgency};
use lattice_storage::{ArtifactStore, ConfigService, EventLog, LockManager, ProjectPaths, ShortIdIndex};
use serde_json::{json, Value};

use crate::{hooks, reducer, workflow};

pub struct TaskService {
    paths: ProjectPaths,
    id_gen: Arc<dyn IdGen>,
    clock: Arc<dyn Clock>,
}

/// Caller-provided envelope fields common to every verb (spec §6).
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub idempotency_id: Option<String>,
    pub actor: Option<String>,
    pub triggered_by: Option<String>,
    pub on_behalf_of: Option<String>,
    pub reason: Option<String>,
    pub telemetry: Option<Value>,
}

impl CallOptions {
    fn provenance(&self) -> Option<EventProvenance> {
        let p = EventProvenance {
            triggered_by: self.triggered_by.clone(),
            on_behalf_of: self.on_behalf_of.clone(),
            reason: self.reason.clone(),
        };
        if p.is_empty() {
            None
        } else {
            Some(p)
        }
    }

    /// Resolves the acting identity: explicit argument, then
    /// `LATTICE_ACTOR`, then `config.default_actor` (spec §6).
    fn resolve_actor(&self, config: &Config) -> Result<Actor, LatticeError> {
        let raw = self
            .actor
            .clone()
            .or_else(|| std::env::var("LATTICE_ACTOR").ok())
            .or_else(|| config.default_actor.clone())
            .ok_or_else(|| LatticeError::invalid_input("no actor resolved: pass --actor, set LATTICE_ACTOR, or configure default_actor"))?;
        Actor::parse(raw).map_err(|e| LatticeError::invalid_input(e.to_string()))
    }
}

pub struct CreateTaskCmd {
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub priority: Option<Priority>,
    pub urgency: Option<Urgency>,
    pub assigned_to: Option<String>,
    pub tags: Vec<String>,
    pub custom_fields: BTreeMap<String, Value>,
}

impl TaskService {
    pub fn new(paths: ProjectPaths, id_gen: Arc<dyn IdGen>, clock: Arc<dyn Clock>) -> Self {
        Self {
            paths,
            id_gen,
            clock,
        }
    }

    pub fn config(&self) -> Result<Config, LatticeError> {
        ConfigService::new(&self.paths).load()
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Resolves a short ID alias (e.g. `PROJ-12`) or a bare task ULID to
    /// a task ULID. Passes bare ULIDs through unchanged when no project
    /// code is configured, or when the string isn't a known alias.
    pub fn resolve_id(&self, config: &Config, id_or_alias: &str) -> Result<String, LatticeError> {
        match &config.project_code {
            Some(project_code) => match ShortIdIndex::new(&self.paths).resolve(project_code, id_or_alias) {
                Ok(resolved) => Ok(resolved),
                Err(lattice_storage::ShortIdError::NotFound(_)) => Ok(id_or_alias.to_string()),
                Err(e) => Err(e.into()),
            },
            None => Ok(id_or_alias.to_string()),
        }
    }

    /// All task snapshots currently on disk (archived tasks excluded,
    /// since they live under `archive/tasks/`).
    pub fn list(&self) -> Result<Vec<Task>, LatticeError> {
        self.all_snapshots()
    }

    /// Read-only selection preview (spec §4.9's "repeated `next(actor)`
    /// calls... return identical results" determinism guarantee) —
    /// unlike `claim`, takes no lock and mutates nothing.
    pub fn peek_next(&self, actor: Option<&str>, status_pool: Option<&[&str]>) -> Result<Option<Task>, LatticeError> {
        let snapshots = self.all_snapshots()?;
        Ok(crate::selector::next(&snapshots, actor, status_pool).cloned())
    }

    fn lock_manager(&self) -> LockManager {
        LockManager::new(self.paths.clone())
    }

    /// Loads a task's snapshot from disk, best-effort rebuilding it from
    /// the event log if the snapshot is missing (spec §7 class 4:
    /// integrity errors are never fatal).
    fn load_or_rebuild(&self, config: &Config, task_id: &str) -> Result<Task, LatticeError> {
        if let Some(task) = lattice_storage::store::read_snapshot::<Task>(&self.paths.task_snapshot(task_id))
            .map_err(|e| LatticeError::integrity_error(e.to_string()))?
        {
            return Ok(task);
        }
        crate::integrity::rebuild_task(&self.paths, config, task_id)?
            .ok_or_else(|| LatticeError::not_found(format!("no such task {task_id}")))
    }

    fn append_and_apply(
        &self,
        config: &Config,
        task: Option<Task>,
        event: Event,
    ) -> Result<(Task, Event), LatticeError> {
        let log = EventLog::new(&self.paths);
        let outcome = log.append(event).map_err(LatticeError::from)?;
        let event = match outcome {
            lattice_storage::AppendOutcome::Appended(e) => e,
            lattice_storage::AppendOutcome::AlreadyApplied(e) => e,
        };

        if event.is_lifecycle() {
            log.append_lifecycle(&event).map_err(LatticeError::from)?;
        }

        let updated = reducer::apply_event(task, &event, config)
            .ok_or_else(|| LatticeError::integrity_error("reducer produced no snapshot"))?;

        lattice_storage::store::write_snapshot_atomic(&self.paths.task_snapshot(&updated.id), &updated)
            .map_err(|e| LatticeError::integrity_error(e.to_string()))?;

        hooks::dispatch(config, &event, self.paths.root());

        Ok((updated, event))
    }

    fn new_event(
        &self,
        opts: &CallOptions,
        config: &Config,
        task_id: &str,
        kind: &str,
        data: Value,
        last_ts: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Event, LatticeError> {
        let actor = opts.resolve_actor(config)?;
        let id = opts
            .idempotency_id
            .clone()
            .unwrap_or_else(|| self.id_gen.next_event_id());
        let ts = lattice_storage::event_log::next_timestamp(self.clock.as_ref(), last_ts);
        Ok(Event {
            id,
            kind: kind.to_string(),
            task_id: task_id.to_string(),
            actor,
            ts,
            data,
            provenance: opts.provenance(),
            telemetry: opts.telemetry.clone(),
        })
    }

    pub fn get(&self, task_id: &str) -> Result<Task, LatticeError> {
        let config = self.config()?;
        self.load_or_rebuild(&config, task_id)
    }

    pub fn create(&self, cmd: CreateTaskCmd, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let task_id = opts
            .idempotency_id
            .clone()
            .unwrap_or_else(|| self.id_gen.next_task_id());

        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[&task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let priority = cmd.priority.unwrap_or(Priority::Medium);
        let urgency = cmd.urgency.unwrap_or(Urgency::Normal);

        let data = json!({
            "title": cmd.title,
            "description": cmd.description,
            "type": cmd.task_type,
            "priority": priority,
            "urgency": urgency,
            "assigned_to": cmd.assigned_to,
            "tags": cmd.tags,
            "custom_fields": cmd.custom_fields,
        });

        let event = self.new_event(&opts, &config, &task_id, "task_created", data, None)?;
        let (task, _) = self.append_and_apply(&config, None, event)?;

        if let Some(project_code) = &config.project_code {
            let _ids_guard = locks
                .acquire(&["ids"])
                .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;
            let short_ids = ShortIdIndex::new(&self.paths);
            let _ = short_ids.allocate(project_code, &task_id);
        }

        Ok(task)
    }

    pub fn update(&self, task_id: &str, path: Vec<String>, value: Value, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        if lattice_core::event::is_protected_field(&path) {
            return Err(LatticeError::protected_field(format!(
                "field {:?} is protected; use a dedicated verb",
                path.first()
            )));
        }

        let task = self.load_or_rebuild(&config, task_id)?;
        let previous_value = read_field(&task, &path);

        let data = serde_json::to_value(FieldUpdatedData {
            path,
            value,
            previous_value,
        })
        .map_err(|e| LatticeError::invalid_input(e.to_string()))?;

        let event = self.new_event(&opts, &config, task_id, "field_updated", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn change_status(
        &self,
        task_id: &str,
        to: &str,
        force: bool,
        opts: CallOptions,
    ) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        let log = EventLog::new(&self.paths);
        let (events, _) = log.iterate(task_id).map_err(LatticeError::from)?;

        workflow::validate_status_change(&config, &task, &events, to, force, opts.reason.as_deref())?;

        let data = serde_json::to_value(StatusChangedData {
            from: task.status.clone(),
            to: to.to_string(),
            forced: force,
        })
        .map_err(|e| LatticeError::invalid_input(e.to_string()))?;

        let event = self.new_event(&opts, &config, task_id, "status_changed", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn assign(&self, task_id: &str, assigned_to: Option<String>, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        let data = json!({"assigned_to": assigned_to});
        let event = self.new_event(&opts, &config, task_id, "assignment_changed", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn comment_add(&self, task_id: &str, body: String, role: Option<String>, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        let comment_id = self.id_gen.next_event_id();
        let data = json!({"id": comment_id, "body": body, "role": role});
        let event = self.new_event(&opts, &config, task_id, "comment_added", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn comment_edit(&self, task_id: &str, comment_id: &str, body: String, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        if !task.comments.iter().any(|c| c.id == comment_id) {
            return Err(LatticeError::not_found(format!("no such comment {comment_id}")));
        }
        let data = json!({"id": comment_id, "body": body});
        let event = self.new_event(&opts, &config, task_id, "comment_edited", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn comment_delete(&self, task_id: &str, comment_id: &str, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        if !task.comments.iter().any(|c| c.id == comment_id) {
            return Err(LatticeError::not_found(format!("no such comment {comment_id}")));
        }
        let data = json!({"id": comment_id});
        let event = self.new_event(&opts, &config, task_id, "comment_deleted", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    /// Links two tasks. Both task locks are acquired pre-sorted
    /// lexicographically (spec §4.3/§5) to avoid cross-verb deadlock.
    pub fn link(&self, src_id: &str, kind: &str, target_id: &str, note: Option<String>, opts: CallOptions) -> Result<(Task, Task), LatticeError> {
        if src_id == target_id {
            return Err(LatticeError::self_link(format!("{src_id} cannot link to itself")));
        }

        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[src_id, target_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let src = self.load_or_rebuild(&config, src_id)?;
        if src.has_relationship(target_id, kind) {
            return Err(LatticeError::duplicate_link(format!(
                "{src_id} already has a {kind} relationship to {target_id}"
            )));
        }

        let data = json!({"target_id": target_id, "type": kind, "note": note});
        let event = self.new_event(&opts, &config, src_id, "relationship_added", data, Some(src.updated_at))?;
        let (src, _) = self.append_and_apply(&config, Some(src), event)?;

        let target = self.load_or_rebuild(&config, target_id)?;
        Ok((src, target))
    }

    pub fn unlink(&self, src_id: &str, kind: &str, target_id: &str, opts: CallOptions) -> Result<(Task, Task), LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[src_id, target_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let src = self.load_or_rebuild(&config, src_id)?;
        if !src.has_relationship(target_id, kind) {
            return Err(LatticeError::link_not_found(format!(
                "{src_id} has no {kind} relationship to {target_id}"
            )));
        }

        let data = json!({"target_id": target_id, "type": kind});
        let event = self.new_event(&opts, &config, src_id, "relationship_removed", data, Some(src.updated_at))?;
        let (src, _) = self.append_and_apply(&config, Some(src), event)?;

        let target = self.load_or_rebuild(&config, target_id)?;
        Ok((src, target))
    }

    pub fn attach(
        &self,
        task_id: &str,
        source: lattice_core::ArtifactSource,
        file_path: Option<&std::path::Path>,
        payload_ref: String,
        role: Option<String>,
        sensitive: bool,
        opts: CallOptions,
    ) -> Result<(Task, lattice_core::Artifact), LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        let actor = opts.resolve_actor(&config)?;
        let artifact_id = self.id_gen.next_artifact_id();

        let artifact = lattice_core::Artifact {
            id: artifact_id.clone(),
            task_id: task_id.to_string(),
            source,
            payload_ref,
            title: None,
            summary: None,
            sensitive,
            role: role.clone(),
            created_at: self.clock.now(),
            actor: actor.as_str().to_string(),
            payload_sha256: None,
        };

        let store = ArtifactStore::new(&self.paths);
        let artifact = store.put(artifact, file_path).map_err(|e| match e {
            lattice_storage::ArtifactStoreError::TooLarge { size, limit } => {
                LatticeError::payload_too_large(format!("{size} bytes exceeds the {limit} byte cap"))
            }
            lattice_storage::ArtifactStoreError::PathNotFound(p) => {
                LatticeError::invalid_input(format!("no such file {}", p.display()))
            }
            other => LatticeError::integrity_error(other.to_string()),
        })?;

        let data = json!({"artifact_id": artifact_id, "role": role});
        let event = self.new_event(&opts, &config, task_id, "artifact_attached", data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok((task, artifact))
    }

    pub fn archive(&self, task_id: &str, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        if task.archived {
            return Err(LatticeError::already_archived(format!("{task_id} is already archived")));
        }

        let event = self.new_event(&opts, &config, task_id, "task_archived", json!({}), Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    pub fn unarchive(&self, task_id: &str, opts: CallOptions) -> Result<Task, LatticeError> {
        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        if !task.archived {
            return Err(LatticeError::not_archived(format!("{task_id} is not archived")));
        }

        let event = self.new_event(&opts, &config, task_id, "task_unarchived", json!({}), Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }

    fn all_snapshots(&self) -> Result<Vec<Task>, LatticeError> {
        let dir = self.paths.root().join("tasks");
        let mut tasks = Vec::new();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(tasks),
            Err(e) => return Err(LatticeError::integrity_error(e.to_string())),
        };
        for entry in entries {
            let entry = entry.map_err(|e| LatticeError::integrity_error(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(task) = lattice_storage::store::read_snapshot::<Task>(&path)
                .map_err(|e| LatticeError::integrity_error(e.to_string()))?
            {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Atomic `next + assign + status_changed(in_progress)` (spec §4.9):
    /// picks a candidate, then re-verifies eligibility inside the
    /// candidate's own lock scope before mutating, retrying against a
    /// fresh read if another claim raced it out from under us.
    pub fn claim(&self, actor: &str, status_pool: Option<&[&str]>, opts: CallOptions) -> Result<Task, LatticeError> {
        const MAX_ATTEMPTS: usize = 5;
        let config = self.config()?;
        let pool: Vec<&str> = status_pool
            .map(|p| p.to_vec())
            .unwrap_or_else(|| crate::selector::DEFAULT_POOL.to_vec());

        for _ in 0..MAX_ATTEMPTS {
            let snapshots = self.all_snapshots()?;
            let candidate_id = match crate::selector::next(&snapshots, Some(actor), Some(&pool)) {
                Some(task) => task.id.clone(),
                None => return Err(LatticeError::nothing_to_claim("no eligible task for this actor")),
            };

            let locks = self.lock_manager();
            let _guard = locks
                .acquire(&[&candidate_id])
                .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

            let task = self.load_or_rebuild(&config, &candidate_id)?;
            // The candidate may have come from the resume set (status
            // already in_progress/in_planning, assigned to actor) or the
            // ready set (status in pool, unassigned or assigned to actor);
            // re-verify against whichever branch actually produced it, not
            // a single hardcoded pool, or a resumable in-progress task
            // spuriously fails re-verification every attempt.
            let is_resumable = !task.archived
                && crate::selector::RESUME_STATUSES.contains(&task.status.as_str())
                && task.assigned_to.as_deref() == Some(actor);
            let is_ready = !task.archived
                && pool.contains(&task.status.as_str())
                && (task.assigned_to.is_none() || task.assigned_to.as_deref() == Some(actor));
            if !is_resumable && !is_ready {
                continue;
            }

            let task = if task.assigned_to.as_deref() == Some(actor) {
                task
            } else {
                let assign_data = json!({"assigned_to": actor});
                let assign_event = self.new_event(&opts, &config, &candidate_id, "assignment_changed", assign_data, Some(task.updated_at))?;
                let (task, _) = self.append_and_apply(&config, Some(task), assign_event)?;
                task
            };

            if task.status == "in_progress" {
                return Ok(task);
            }

            let log = EventLog::new(&self.paths);
            let (events, _) = log.iterate(&candidate_id).map_err(LatticeError::from)?;
            workflow::validate_claim_advance(&config, &task, &events)?;

            let status_data = serde_json::to_value(StatusChangedData {
                from: task.status.clone(),
                to: "in_progress".to_string(),
                forced: false,
            })
            .map_err(|e| LatticeError::invalid_input(e.to_string()))?;
            let status_event = self.new_event(&opts, &config, &candidate_id, "status_changed", status_data, Some(task.updated_at))?;
            let (task, _) = self.append_and_apply(&config, Some(task), status_event)?;

            return Ok(task);
        }

        Err(LatticeError::nothing_to_claim(format!(
            "no task stayed eligible after {MAX_ATTEMPTS} attempts; try again"
        )))
    }

    pub fn record_custom_event(&self, task_id: &str, x_type: &str, data: Value, opts: CallOptions) -> Result<Task, LatticeError> {
        if !x_type.starts_with("x_") {
            return Err(LatticeError::reserved_type(format!(
                "{x_type} is not an extension type; custom event types must start with x_"
            )));
        }
        if Event::is_reserved_type(x_type) {
            return Err(LatticeError::reserved_type(format!("{x_type} is a reserved built-in type")));
        }

        let config = self.config()?;
        let locks = self.lock_manager();
        let _guard = locks
            .acquire(&[task_id])
            .map_err(|e| LatticeError::lock_timeout(e.to_string()))?;

        let task = self.load_or_rebuild(&config, task_id)?;
        let event = self.new_event(&opts, &config, task_id, x_type, data, Some(task.updated_at))?;
        let (task, _) = self.append_and_apply(&config, Some(task), event)?;
        Ok(task)
    }
}

fn read_field(task: &Task, path: &[String]) -> Option<Value> {
    let task_json = serde_json::to_value(task).ok()?;
    let mut current = &task_json;
    for key in path {
        current = current.get(key)?;
    }
    Some(current.clone())
}

#[cfg(test)]
#[path = "task_service_tests.rs"]
mod tests;
