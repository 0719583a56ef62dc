//! The `next`/`claim` task-selection algorithm (spec §4.9).

use lattice_core::task::Task;

pub(crate) const DEFAULT_POOL: [&str; 2] = ["backlog", "planned"];
pub(crate) const RESUME_STATUSES: [&str; 2] = ["in_progress", "in_planning"];

fn sort_key(task: &Task) -> (u8, u8, String) {
    (task.priority.rank(), task.urgency.rank(), task.id.clone())
}

/// Selects the next task for `actor` (or for nobody, if `actor` is
/// `None`). Resume set (in-flight work already assigned to `actor`)
/// takes priority over the ready set (spec §4.9).
pub fn next<'a>(snapshots: &'a [Task], actor: Option<&str>, status_pool: Option<&[&str]>) -> Option<&'a Task> {
    let pool: Vec<&str> = status_pool
        .map(|p| p.to_vec())
        .unwrap_or_else(|| DEFAULT_POOL.to_vec());

    if let Some(actor) = actor {
        let mut resume: Vec<&Task> = snapshots
            .iter()
            .filter(|t| !t.archived)
            .filter(|t| RESUME_STATUSES.contains(&t.status.as_str()))
            .filter(|t| t.assigned_to.as_deref() == Some(actor))
            .collect();
        if !resume.is_empty() {
            resume.sort_by_key(|t| sort_key(t));
            return resume.into_iter().next();
        }
    }

    let mut ready: Vec<&Task> = snapshots
        .iter()
        .filter(|t| !t.archived)
        .filter(|t| pool.contains(&t.status.as_str()))
        .filter(|t| t.assigned_to.is_none() || t.assigned_to.as_deref() == actor)
        .collect();
    if ready.is_empty() {
        return None;
    }
    ready.sort_by_key(|t| sort_key(t));
    ready.into_iter().next()
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
