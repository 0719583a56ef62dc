//! Post-write hook dispatch (spec §6): match configured patterns against
//! the just-written event, expand placeholders, and spawn a detached
//! subprocess. Spawn failures are logged, never propagated — a verb's
//! result never depends on whether its hooks ran.

use std::collections::BTreeMap;
use std::process::{Command, Stdio};

use lattice_core::event::Event;
use lattice_core::Config;
use tracing::warn;

/// Matches a hook pattern like `"* -> review"` or `"on_status_change"`
/// or a bare event type against `event`.
fn pattern_matches(pattern: &str, event: &Event) -> bool {
    if pattern == "on_status_change" {
        return event.kind == "status_changed";
    }
    if let Some((from, to)) = pattern.split_once("->") {
        let from = from.trim();
        let to = to.trim();
        if event.kind != "status_changed" {
            return false;
        }
        let Ok(data) = serde_json::from_value::<lattice_core::event::StatusChangedData>(event.data.clone())
        else {
            return false;
        };
        let from_ok = from == "*" || from == data.from;
        let to_ok = to == "*" || to == data.to;
        return from_ok && to_ok;
    }
    pattern == event.kind
}

fn placeholders(event: &Event, root: &std::path::Path) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("task_id".to_string(), event.task_id.clone());
    map.insert("actor".to_string(), event.actor.as_str().to_string());
    if let Ok(data) = serde_json::from_value::<lattice_core::event::StatusChangedData>(event.data.clone()) {
        map.insert("from".to_string(), data.from);
        map.insert("to".to_string(), data.to);
    }
    map.insert("LATTICE_TASK_ID".to_string(), event.task_id.clone());
    map.insert("LATTICE_ROOT".to_string(), root.to_string_lossy().into_owned());
    map
}

fn expand_template(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Fires every hook whose pattern matches `event`. Forced transitions
/// fire hooks exactly like normal ones (spec §9's resolution of that
/// open question).
pub fn dispatch(config: &Config, event: &Event, root: &std::path::Path) {
    let vars = placeholders(event, root);
    for (pattern, template) in &config.hooks {
        if !pattern_matches(pattern, event) {
            continue;
        }
        let command_line = expand_template(template, &vars);
        if let Err(e) = spawn_detached(&command_line, &vars) {
            warn!(pattern = %pattern, command = %command_line, error = %e, "hook failed to spawn");
        }
    }
}

fn spawn_detached(
    command_line: &str,
    vars: &BTreeMap<String, String>,
) -> std::io::Result<()> {
    let mut parts = command_line.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(());
    };
    let mut command = Command::new(program);
    command
        .args(parts)
        .envs(vars)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command.spawn()?;
    Ok(())
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
