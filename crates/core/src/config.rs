//! Workflow configuration (spec §3/§4.12): the status graph, completion
//! policies, review-cycle limit, role vocabulary, and hooks. Loaded from
//! `config.json` by `lattice-storage`'s `ConfigService`; this module
//! owns the shape and the built-in defaults.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionPolicy {
    #[serde(default)]
    pub require_roles: Vec<String>,
    #[serde(default)]
    pub require_assigned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub statuses: Vec<String>,
    pub transitions: BTreeMap<String, BTreeSet<String>>,
    pub default_status: String,
    pub default_priority: String,
    #[serde(default)]
    pub task_types: Vec<String>,
    #[serde(default)]
    pub completion_policies: BTreeMap<String, CompletionPolicy>,
    pub universal_targets: BTreeSet<String>,
    pub review_cycle_limit: u32,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_actor: Option<String>,
    #[serde(default)]
    pub wip_limits: BTreeMap<String, u32>,
    #[serde(default)]
    pub hooks: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let statuses = vec![
            "backlog",
            "planned",
            "in_planning",
            "in_progress",
            "review",
            "done",
            "needs_human",
            "cancelled",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();

        let chain = [
            ("backlog", "planned"),
            ("planned", "in_planning"),
            ("in_planning", "in_progress"),
            ("in_progress", "review"),
            ("review", "done"),
        ];

        let mut transitions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (from, to) in chain {
            transitions
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string());
        }
        // review can cycle back for another pass
        transitions
            .entry("review".to_string())
            .or_default()
            .extend(["in_progress".to_string(), "in_planning".to_string()]);

        let universal_targets: BTreeSet<String> =
            ["needs_human", "cancelled"].into_iter().map(String::from).collect();
        for status in &statuses {
            if status == "done" || status == "cancelled" {
                continue;
            }
            let entry = transitions.entry(status.clone()).or_default();
            entry.extend(universal_targets.iter().cloned());
        }

        let mut completion_policies = BTreeMap::new();
        completion_policies.insert(
            "done".to_string(),
            CompletionPolicy {
                require_roles: vec!["review".to_string()],
                require_assigned: true,
            },
        );

        Config {
            statuses,
            transitions,
            default_status: "backlog".to_string(),
            default_priority: "medium".to_string(),
            task_types: vec!["task".to_string(), "epic".to_string(), "bug".to_string()],
            completion_policies,
            universal_targets,
            review_cycle_limit: 3,
            roles: vec!["review".to_string()],
            project_code: None,
            default_actor: None,
            wip_limits: BTreeMap::new(),
            hooks: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Rejects configs where `transitions` references an unknown status
    /// or `default_status` is not itself configured (spec §4.12).
    pub fn validate(&self) -> Result<(), LatticeError> {
        let known: BTreeSet<&str> = self.statuses.iter().map(String::as_str).collect();

        if !known.contains(self.default_status.as_str()) {
            return Err(LatticeError::invalid_input(format!(
                "default_status {:?} is not in statuses",
                self.default_status
            )));
        }

        for (from, targets) in &self.transitions {
            if !known.contains(from.as_str()) {
                return Err(LatticeError::invalid_input(format!(
                    "transitions references unknown source status {from:?}"
                )));
            }
            for to in targets {
                if !known.contains(to.as_str()) {
                    return Err(LatticeError::invalid_input(format!(
                        "transitions[{from:?}] references unknown target status {to:?}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Union of `roles` and every role named in a completion policy
    /// (spec §4.7 "role vocabulary").
    pub fn role_vocabulary(&self) -> BTreeSet<String> {
        let mut roles: BTreeSet<String> = self.roles.iter().cloned().collect();
        for policy in self.completion_policies.values() {
            roles.extend(policy.require_roles.iter().cloned());
        }
        roles
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
