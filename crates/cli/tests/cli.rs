//! Black-box tests driving the `lattice` binary end to end against a
//! throwaway `.lattice/` directory, the way a real user would invoke it.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn lattice(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("lattice").expect("lattice binary builds");
    cmd.arg("-C").arg(dir).env("LATTICE_ACTOR", "human:alice");
    cmd
}

#[test]
fn init_then_create_then_show_round_trips() {
    let tmp = tempdir().expect("tempdir");
    lattice(tmp.path()).args(["init"]).assert().success();

    let create = lattice(tmp.path())
        .args(["-o", "json", "create", "write the launch doc", "--priority", "high"])
        .output()
        .expect("create runs");
    assert!(create.status.success());
    let stdout = String::from_utf8_lossy(&create.stdout);
    let envelope: serde_json::Value = serde_json::from_str(&stdout).expect("valid json envelope");
    assert_eq!(envelope["ok"], true);
    let id = envelope["data"]["id"].as_str().expect("task id").to_string();
    assert_eq!(envelope["data"]["status"], "backlog");

    lattice(tmp.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicates::str::contains("launch doc"));
}

#[test]
fn status_without_evidence_is_completion_blocked() {
    let tmp = tempdir().expect("tempdir");
    lattice(tmp.path()).args(["init"]).assert().success();

    let create = lattice(tmp.path())
        .args(["-o", "json", "create", "ship it"])
        .output()
        .expect("create runs");
    let envelope: serde_json::Value = serde_json::from_slice(&create.stdout).expect("valid json");
    let id = envelope["data"]["id"].as_str().expect("task id").to_string();

    let attempt = lattice(tmp.path())
        .args(["-o", "json", "status", &id, "done"])
        .output()
        .expect("status runs");
    assert!(!attempt.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&attempt.stdout).expect("valid json");
    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"]["code"], "INVALID_TRANSITION");
}

#[test]
fn self_link_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    lattice(tmp.path()).args(["init"]).assert().success();

    let create = lattice(tmp.path())
        .args(["-o", "json", "create", "a task"])
        .output()
        .expect("create runs");
    let envelope: serde_json::Value = serde_json::from_slice(&create.stdout).expect("valid json");
    let id = envelope["data"]["id"].as_str().expect("task id").to_string();

    let link = lattice(tmp.path())
        .args(["-o", "json", "link", &id, "blocks", &id])
        .output()
        .expect("link runs");
    let envelope: serde_json::Value = serde_json::from_slice(&link.stdout).expect("valid json");
    assert_eq!(envelope["error"]["code"], "SELF_LINK");
}

#[test]
fn claim_with_no_eligible_tasks_reports_nothing_to_claim() {
    let tmp = tempdir().expect("tempdir");
    lattice(tmp.path()).args(["init"]).assert().success();

    let claim = lattice(tmp.path())
        .args(["-o", "json", "claim", "agent:claude"])
        .output()
        .expect("claim runs");
    let envelope: serde_json::Value = serde_json::from_slice(&claim.stdout).expect("valid json");
    assert_eq!(envelope["error"]["code"], "NOTHING_TO_CLAIM");
}

#[test]
fn doctor_reports_clean_store() {
    let tmp = tempdir().expect("tempdir");
    lattice(tmp.path()).args(["init"]).assert().success();
    lattice(tmp.path()).args(["create", "a task"]).assert().success();

    lattice(tmp.path())
        .args(["doctor"])
        .assert()
        .success()
        .stdout(predicates::str::contains("clean"));
}
