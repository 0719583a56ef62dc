//! Content-fingerprinted file payloads with sidecar metadata (spec
//! §4.11): files are copied into `artifacts/payload/<id>.<ext>` via
//! atomic rename; URLs and other by-reference sources are recorded
//! without a payload copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lattice_core::Artifact;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::paths::ProjectPaths;
use crate::store::{self, StoreError};

/// Default size cap for file payloads: 10 MiB (spec §4.11: "configurable;
/// default multi-megabyte").
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("payload of {size} bytes exceeds the {limit} byte cap")]
    TooLarge { size: u64, limit: u64 },
    #[error("source path {0} does not exist")]
    PathNotFound(PathBuf),
}

pub struct ArtifactStore<'a> {
    paths: &'a ProjectPaths,
    max_payload_bytes: u64,
}

impl<'a> ArtifactStore<'a> {
    pub fn new(paths: &'a ProjectPaths) -> Self {
        Self {
            paths,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn with_max_payload_bytes(mut self, max: u64) -> Self {
        self.max_payload_bytes = max;
        self
    }

    /// Copies a file payload into the store (for `ArtifactSource::File`)
    /// and writes the sidecar metadata; for by-reference sources, writes
    /// only the metadata with `payload_ref` set to the caller-given URL.
    pub fn put(
        &self,
        mut artifact: Artifact,
        file_source: Option<&Path>,
    ) -> Result<Artifact, ArtifactStoreError> {
        if artifact.source.is_file_backed() {
            let source = file_source.ok_or_else(|| {
                ArtifactStoreError::PathNotFound(PathBuf::from(&artifact.payload_ref))
            })?;
            if !source.exists() {
                return Err(ArtifactStoreError::PathNotFound(source.to_path_buf()));
            }

            let size = fs::metadata(source)?.len();
            if size > self.max_payload_bytes {
                return Err(ArtifactStoreError::TooLarge {
                    size,
                    limit: self.max_payload_bytes,
                });
            }

            let ext = source
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string();
            let dest = self.paths.artifact_payload(&artifact.id, &ext);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            let bytes = fs::read(source)?;
            let tmp = dest.with_extension(format!("{ext}.tmp"));
            fs::write(&tmp, &bytes)?;
            fs::rename(&tmp, &dest)?;

            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            artifact.payload_sha256 = Some(format!("{:x}", hasher.finalize()));
            artifact.payload_ref = dest
                .strip_prefix(self.paths.root())
                .unwrap_or(&dest)
                .to_string_lossy()
                .into_owned();
        }

        let meta_path = self.paths.artifact_meta(&artifact.id);
        store::write_snapshot_atomic(&meta_path, &artifact)?;
        Ok(artifact)
    }

    pub fn meta(&self, artifact_id: &str) -> Result<Option<Artifact>, ArtifactStoreError> {
        let path = self.paths.artifact_meta(artifact_id);
        Ok(store::read_snapshot(&path)?)
    }

    /// Returns the absolute payload path for a file-backed artifact, or
    /// `None` for by-reference sources.
    pub fn payload_path(&self, artifact: &Artifact) -> Option<PathBuf> {
        if !artifact.source.is_file_backed() {
            return None;
        }
        Some(self.paths.root().join(&artifact.payload_ref))
    }

    pub fn get(&self, artifact_id: &str) -> Result<Option<Vec<u8>>, ArtifactStoreError> {
        let Some(artifact) = self.meta(artifact_id)? else {
            return Ok(None);
        };
        let Some(path) = self.payload_path(&artifact) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "artifact_store_tests.rs"]
mod tests;
