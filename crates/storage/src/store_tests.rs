use super::*;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sample {
    name: String,
    n: u32,
}

#[test]
fn write_then_read_snapshot_round_trips() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tasks/task_1.json");
    let value = Sample {
        name: "a".into(),
        n: 1,
    };
    write_snapshot_atomic(&path, &value).unwrap();
    assert!(!tmp_path_for(&path).exists());
    let loaded: Sample = read_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded, value);
}

#[test]
fn read_snapshot_missing_file_returns_none() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tasks/missing.json");
    let loaded: Option<Sample> = read_snapshot(&path).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn append_jsonl_accumulates_lines_in_order() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("events/task_1.jsonl");
    append_jsonl_line(&path, &Sample { name: "a".into(), n: 1 }).unwrap();
    append_jsonl_line(&path, &Sample { name: "b".into(), n: 2 }).unwrap();

    let (records, corrupt): (Vec<Sample>, bool) = read_jsonl(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "a");
    assert_eq!(records[1].name, "b");
    assert!(!corrupt);
}

#[test]
fn read_jsonl_tolerates_corrupt_trailing_line() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("events/task_2.jsonl");
    append_jsonl_line(&path, &Sample { name: "a".into(), n: 1 }).unwrap();
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    use std::io::Write as _;
    writeln!(file, "{{not valid json").unwrap();

    let (records, corrupt): (Vec<Sample>, bool) = read_jsonl(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert!(corrupt);
}
