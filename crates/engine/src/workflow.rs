//! Config-driven status graph: transition validation, completion-policy
//! evidence gating, review-cycle limiting, and epic derived-status
//! computation (spec §4.7).

use std::collections::BTreeMap;

use lattice_core::event::Event;
use lattice_core::task::Task;
use lattice_core::{Config, LatticeError};

/// Result of a transition-validity check, carrying the finite set of
/// valid alternatives so error messages can enumerate them (spec §7).
pub struct TransitionCheck {
    pub allowed: bool,
    pub valid_targets: Vec<String>,
}

pub fn check_transition(config: &Config, from: &str, to: &str) -> TransitionCheck {
    let valid_targets: Vec<String> = config
        .transitions
        .get(from)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();
    let allowed = valid_targets.iter().any(|t| t == to);
    TransitionCheck {
        allowed,
        valid_targets,
    }
}

/// Validates a requested status change, applying the completion-policy
/// evidence gate and the review-cycle limit. `force` bypasses the
/// transition-graph and review-cycle checks (not completion policy,
/// which spec §4.7 does not list as force-bypassable) but still
/// requires a non-empty `reason`.
pub fn validate_status_change(
    config: &Config,
    task: &Task,
    events: &[Event],
    to: &str,
    force: bool,
    reason: Option<&str>,
) -> Result<(), LatticeError> {
    if force && reason.map(str::trim).unwrap_or("").is_empty() {
        return Err(LatticeError::force_requires_reason(
            "--force requires a non-empty reason",
        ));
    }

    if !force {
        let check = check_transition(config, &task.status, to);
        if !check.allowed {
            return Err(LatticeError::invalid_transition(format!(
                "cannot move from {} to {}; valid targets: [{}]",
                task.status,
                to,
                check.valid_targets.join(", ")
            )));
        }
    }

    validate_policy_and_review_cycle(config, task, events, to, force)
}

/// The completion-policy evidence gate and review-cycle limit, shared by
/// `validate_status_change` and `validate_claim_advance` — the half of
/// status-change validation that isn't about which edges the transition
/// graph exposes.
fn validate_policy_and_review_cycle(
    config: &Config,
    task: &Task,
    events: &[Event],
    to: &str,
    force: bool,
) -> Result<(), LatticeError> {
    if !config.universal_targets.contains(to) {
        if let Some(policy) = config.completion_policies.get(to) {
            let missing_roles: Vec<&str> = policy
                .require_roles
                .iter()
                .filter(|role| !task.has_role(role))
                .map(String::as_str)
                .collect();
            let missing_assignment = policy.require_assigned && task.assigned_to.is_none();

            if !missing_roles.is_empty() || missing_assignment {
                let mut parts = Vec::new();
                if !missing_roles.is_empty() {
                    parts.push(format!("missing roles: [{}]", missing_roles.join(", ")));
                }
                if missing_assignment {
                    parts.push("task is not assigned".to_string());
                }
                return Err(LatticeError::completion_blocked(parts.join("; ")));
            }
        }
    }

    if !force && is_review_cycle_transition(&task.status, to) {
        let count = count_review_cycles(events);
        if count >= config.review_cycle_limit {
            return Err(LatticeError::review_cycle_exceeded(format!(
                "task has already cycled through review {count} times (limit {})",
                config.review_cycle_limit
            )));
        }
    }

    Ok(())
}

/// Validates the `status_changed(in_progress)` half of `claim` (spec
/// §4.9). Pool membership in `selector::next` is itself the transition
/// authorization — a fresh `backlog`/`planned` task has no direct edge
/// to `in_progress` in the configured transition graph, so claiming one
/// is not a graph-valid move by the rules `change_status` enforces, but
/// it is exactly what the selector's ready pool exists to allow. This
/// skips `check_transition` for that reason while still enforcing
/// completion policy and the review-cycle limit for configs that extend
/// either to `in_progress`.
pub fn validate_claim_advance(config: &Config, task: &Task, events: &[Event]) -> Result<(), LatticeError> {
    validate_policy_and_review_cycle(config, task, events, "in_progress", false)
}

fn is_review_cycle_transition(from: &str, to: &str) -> bool {
    from == "review" && (to == "in_progress" || to == "in_planning")
}

/// Counts prior `status_changed` events of shape `review -> {in_progress,
/// in_planning}` in the task's own log — a pure derivation, not a
/// separate counter field (spec §4.7, SPEC_FULL.md).
pub fn count_review_cycles(events: &[Event]) -> u32 {
    events
        .iter()
        .filter(|e| e.kind == "status_changed")
        .filter_map(|e| serde_json::from_value::<lattice_core::event::StatusChangedData>(e.data.clone()).ok())
        .filter(|data| is_review_cycle_transition(&data.from, &data.to))
        .count() as u32
}

/// Child statuses feeding an epic's derived status computation.
pub fn compute_epic_derived_status(children: &[&str]) -> &'static str {
    if children.is_empty() {
        return "backlog";
    }
    if children.iter().any(|s| *s == "in_progress") {
        return "in_progress";
    }
    let all_done_or_cancelled = children
        .iter()
        .all(|s| *s == "done" || *s == "cancelled");
    let any_done = children.iter().any(|s| *s == "done");
    if all_done_or_cancelled && any_done {
        return "done";
    }
    if children.iter().all(|s| *s == "cancelled") {
        return "cancelled";
    }
    // Resolution of spec §9's open question: blocked is checked only
    // after the in_progress / all-done-or-cancelled / all-cancelled
    // rules above, so {blocked, done} falls through to blocked rather
    // than done, matching the literal rule order in spec §4.7.
    if children.iter().any(|s| *s == "blocked") {
        return "blocked";
    }
    if children.iter().any(|s| *s == "planned") {
        return "planned";
    }
    "backlog"
}

/// Union of `config.roles` and every role named in a completion policy.
pub fn role_vocabulary(config: &Config) -> BTreeMap<String, ()> {
    config
        .role_vocabulary()
        .into_iter()
        .map(|r| (r, ()))
        .collect()
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
