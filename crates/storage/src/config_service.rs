//! Loads and persists `config.json` (spec §4.12). Validation itself
//! lives on `lattice_core::Config`; this module is purely the file I/O
//! and the missing-file-uses-defaults fallback.

use lattice_core::{Config, LatticeError};

use crate::paths::ProjectPaths;
use crate::store::{self, StoreError};

pub struct ConfigService<'a> {
    paths: &'a ProjectPaths,
}

impl<'a> ConfigService<'a> {
    pub fn new(paths: &'a ProjectPaths) -> Self {
        Self { paths }
    }

    pub fn load(&self) -> Result<Config, LatticeError> {
        let config: Option<Config> = store::read_snapshot(&self.paths.config())
            .map_err(|e: StoreError| LatticeError::integrity_error(e.to_string()))?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), LatticeError> {
        config.validate()?;
        store::write_snapshot_atomic(&self.paths.config(), config)
            .map_err(|e| LatticeError::integrity_error(e.to_string()))
    }
}

#[cfg(test)]
#[path = "config_service_tests.rs"]
mod tests;
