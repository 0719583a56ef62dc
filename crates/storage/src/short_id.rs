//! Bidirectional mapping between human-readable aliases (`PROJ-42`) and
//! task ULIDs (spec §3/§4.13). Fully derivable from `task_created`
//! events, so `rebuild` (in `lattice-engine`) can regenerate it from
//! scratch deterministically.

use std::collections::BTreeMap;

use lattice_core::LatticeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::ProjectPaths;
use crate::store::{self, StoreError};

#[derive(Debug, Error)]
pub enum ShortIdError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no such short id or ulid: {0}")]
    NotFound(String),
}

impl From<ShortIdError> for LatticeError {
    fn from(err: ShortIdError) -> Self {
        match err {
            ShortIdError::NotFound(id) => LatticeError::not_found(format!("unknown id {id}")),
            ShortIdError::Store(e) => {
                LatticeError::integrity_error(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortIdIndexData {
    pub project_code: String,
    pub next_seq: u64,
    pub map: BTreeMap<String, String>,
}

impl ShortIdIndexData {
    pub fn new(project_code: impl Into<String>) -> Self {
        Self {
            project_code: project_code.into(),
            next_seq: 1,
            map: BTreeMap::new(),
        }
    }
}

pub struct ShortIdIndex<'a> {
    paths: &'a ProjectPaths,
}

impl<'a> ShortIdIndex<'a> {
    pub fn new(paths: &'a ProjectPaths) -> Self {
        Self { paths }
    }

    fn path(&self) -> std::path::PathBuf {
        self.paths.ids_index()
    }

    pub fn load(&self, project_code: &str) -> Result<ShortIdIndexData, ShortIdError> {
        Ok(store::read_snapshot(&self.path())?
            .unwrap_or_else(|| ShortIdIndexData::new(project_code)))
    }

    fn save(&self, data: &ShortIdIndexData) -> Result<(), ShortIdError> {
        Ok(store::write_snapshot_atomic(&self.path(), data)?)
    }

    /// Allocates the next sequential short ID for `ulid`. Caller must
    /// hold the `ids.json` lock; this does not lock internally.
    pub fn allocate(&self, project_code: &str, ulid: &str) -> Result<String, ShortIdError> {
        let mut data = self.load(project_code)?;
        let alias = format!("{}-{}", data.project_code, data.next_seq);
        data.next_seq += 1;
        data.map.insert(alias.clone(), ulid.to_string());
        self.save(&data)?;
        Ok(alias)
    }

    /// Resolves an alias or a bare ULID to a ULID. A string that's
    /// already a ULID (not present as a key) is returned unchanged.
    pub fn resolve(&self, project_code: &str, alias_or_ulid: &str) -> Result<String, ShortIdError> {
        let data = self.load(project_code)?;
        if let Some(ulid) = data.map.get(alias_or_ulid) {
            return Ok(ulid.clone());
        }
        if data.map.values().any(|v| v == alias_or_ulid) {
            return Ok(alias_or_ulid.to_string());
        }
        Err(ShortIdError::NotFound(alias_or_ulid.to_string()))
    }

    /// Replaces the index wholesale, used by `rebuild` after scanning
    /// `task_created` events in timestamp order.
    pub fn rebuild_from(
        &self,
        project_code: &str,
        ordered_ulids: &[String],
    ) -> Result<ShortIdIndexData, ShortIdError> {
        let mut data = ShortIdIndexData::new(project_code);
        for ulid in ordered_ulids {
            let alias = format!("{project_code}-{}", data.next_seq);
            data.next_seq += 1;
            data.map.insert(alias, ulid.clone());
        }
        self.save(&data)?;
        Ok(data)
    }
}

#[cfg(test)]
#[path = "short_id_tests.rs"]
mod tests;
