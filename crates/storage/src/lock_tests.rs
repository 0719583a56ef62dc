use super::*;
use tempfile::tempdir;

fn manager_in(dir: &Path) -> LockManager {
    let paths = ProjectPaths::init(dir).unwrap();
    LockManager::new(paths).with_timeout(Duration::from_millis(200))
}

#[test]
fn acquire_then_drop_releases_lock() {
    let tmp = tempdir().unwrap();
    let manager = manager_in(tmp.path());
    {
        let _handle = manager.acquire_one("task_1").unwrap();
    }
    // should not time out now that the handle has been dropped
    let _handle2 = manager.acquire_one("task_1").unwrap();
}

#[test]
fn second_acquire_times_out_while_first_is_held() {
    let tmp = tempdir().unwrap();
    let manager = manager_in(tmp.path());
    let _held = manager.acquire_one("task_1").unwrap();
    let err = manager.acquire_one("task_1").unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));
}

#[test]
fn multi_resource_acquire_sorts_paths() {
    let tmp = tempdir().unwrap();
    let manager = manager_in(tmp.path());
    let handles = manager.acquire(&["task_b", "task_a"]).unwrap();
    assert_eq!(handles.len(), 2);
    assert!(handles[0].path().to_string_lossy().contains("task_a"));
    assert!(handles[1].path().to_string_lossy().contains("task_b"));
}

#[test]
fn process_is_alive_true_for_own_pid() {
    assert!(process_is_alive(std::process::id()));
}

#[test]
fn process_is_alive_false_for_implausible_pid() {
    // PIDs this large can't exist under Linux's default pid_max.
    assert!(!process_is_alive(u32::MAX));
}

fn write_test_marker(lock_path: &Path, pid: u32, age: Duration) {
    let acquired_at_epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .saturating_sub(age)
        .as_millis();
    let marker = LockMarker { pid, acquired_at_epoch_ms };
    fs::write(marker_path(lock_path), serde_json::to_vec(&marker).unwrap()).unwrap();
}

#[test]
fn stale_marker_from_a_dead_pid_is_cleared() {
    let tmp = tempdir().unwrap();
    let lock_path = tmp.path().join("task_1.lock");
    write_test_marker(&lock_path, u32::MAX, STALE_LOCK_AGE + Duration::from_secs(1));

    break_if_stale(&lock_path);

    assert!(!marker_path(&lock_path).exists());
}

#[test]
fn stale_looking_marker_from_a_live_pid_is_kept() {
    let tmp = tempdir().unwrap();
    let lock_path = tmp.path().join("task_1.lock");
    write_test_marker(&lock_path, std::process::id(), STALE_LOCK_AGE + Duration::from_secs(1));

    break_if_stale(&lock_path);

    assert!(marker_path(&lock_path).exists());
}
