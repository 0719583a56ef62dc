//! Raw file I/O for Lattice's state directory: project root discovery,
//! advisory locks, atomic snapshot writes, append-only event logs, the
//! artifact store, the short-ID index, and config persistence. No
//! workflow or reducer logic lives here — see `lattice-engine`.

pub mod artifact_store;
pub mod config_service;
pub mod event_log;
pub mod lock;
pub mod paths;
pub mod short_id;
pub mod store;

pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use config_service::ConfigService;
pub use event_log::{AppendOutcome, EventLog, EventLogError};
pub use lock::{LockError, LockHandle, LockManager};
pub use paths::ProjectPaths;
pub use short_id::{ShortIdError, ShortIdIndex, ShortIdIndexData};
pub use store::StoreError;
