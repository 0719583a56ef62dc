//! Raw file I/O: atomic snapshot writes and append-only JSONL writers
//! (spec §4.4), grounded on the teacher's `Snapshot::save`/`Wal::flush`
//! tmp-file-then-rename discipline.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize snapshot for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Serializes `value` as pretty JSON and writes it to `path` atomically:
/// write `<path>.tmp`, `fsync`, then `rename` into place, with a
/// directory fsync so the rename itself is durable (spec §4.4).
pub fn write_snapshot_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;
    }

    let tmp_path = tmp_path_for(path);
    {
        let mut tmp_file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        tmp_file.write_all(&json).map_err(|e| io_err(&tmp_path, e))?;
        tmp_file.write_all(b"\n").map_err(|e| io_err(&tmp_path, e))?;
        tmp_file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    fsync_parent_dir(path);

    Ok(())
}

pub fn read_snapshot<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialize {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Appends one compact JSON line, flushing immediately (spec §4.4:
/// "immediate-flush discipline"). The caller must already hold the
/// relevant lock; this function does not open-then-close repeatedly —
/// callers that append many events in a loop should reuse a single
/// `AppendLog`.
pub fn append_jsonl_line<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;
    }
    let line = serde_json::to_string(value).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    writeln!(file, "{line}").map_err(|e| io_err(path, e))?;
    file.sync_data().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Reads all lines of a JSONL file, tolerating one corrupt trailing
/// line (spec §4.5: "corrupted trailing line is tolerated read-side but
/// reported by doctor"). Returns the parsed records and whether a
/// corrupt tail was encountered.
pub fn read_jsonl<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<(Vec<T>, bool), StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), false)),
        Err(e) => return Err(io_err(path, e)),
    };

    let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut records = Vec::with_capacity(lines.len());
    let mut corrupt_tail = false;

    for (idx, line) in lines.iter().enumerate() {
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                if idx == lines.len() - 1 {
                    warn!(path = %path.display(), error = %e, "tolerating corrupt trailing line");
                    corrupt_tail = true;
                } else {
                    return Err(StoreError::Serialize {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
    }

    Ok((records, corrupt_tail))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn fsync_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
}

fn io_err(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
