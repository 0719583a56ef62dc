use super::*;
use lattice_core::Actor;
use serde_json::json;

fn status_event(from: &str, to: &str) -> Event {
    Event {
        id: "ev_1".to_string(),
        kind: "status_changed".to_string(),
        task_id: "task_1".to_string(),
        actor: Actor::parse("human:alice").unwrap(),
        ts: chrono::Utc::now(),
        data: json!({"from": from, "to": to}),
        provenance: None,
        telemetry: None,
    }
}

#[test]
fn wildcard_to_pattern_matches_any_source() {
    let ev = status_event("in_progress", "review");
    assert!(pattern_matches("* -> review", &ev));
    assert!(!pattern_matches("* -> done", &ev));
}

#[test]
fn on_status_change_matches_any_status_event() {
    let ev = status_event("backlog", "planned");
    assert!(pattern_matches("on_status_change", &ev));
}

#[test]
fn bare_event_type_pattern_matches_literally() {
    let ev = status_event("backlog", "planned");
    assert!(!pattern_matches("comment_added", &ev));
}

#[test]
fn expand_template_substitutes_placeholders() {
    let ev = status_event("in_progress", "review");
    let vars = placeholders(&ev, std::path::Path::new("/proj/.lattice"));
    let expanded = expand_template("notify {task_id} {from}->{to}", &vars);
    assert_eq!(expanded, "notify task_1 in_progress->review");
}
