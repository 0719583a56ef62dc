use super::*;
use tempfile::tempdir;

#[test]
fn allocate_assigns_sequential_aliases() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let index = ShortIdIndex::new(&paths);

    let a = index.allocate("PROJ", "task_01").unwrap();
    let b = index.allocate("PROJ", "task_02").unwrap();
    assert_eq!(a, "PROJ-1");
    assert_eq!(b, "PROJ-2");
}

#[test]
fn resolve_maps_alias_back_to_ulid() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let index = ShortIdIndex::new(&paths);

    let alias = index.allocate("PROJ", "task_01").unwrap();
    assert_eq!(index.resolve("PROJ", &alias).unwrap(), "task_01");
    assert_eq!(index.resolve("PROJ", "task_01").unwrap(), "task_01");
}

#[test]
fn resolve_unknown_id_fails() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let index = ShortIdIndex::new(&paths);
    assert!(index.resolve("PROJ", "PROJ-99").is_err());
}

#[test]
fn rebuild_is_deterministic_given_stable_order() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let index = ShortIdIndex::new(&paths);

    let ulids = vec!["task_01".to_string(), "task_02".to_string()];
    let data = index.rebuild_from("PROJ", &ulids).unwrap();
    assert_eq!(data.map.get("PROJ-1"), Some(&"task_01".to_string()));
    assert_eq!(data.map.get("PROJ-2"), Some(&"task_02".to_string()));
}
