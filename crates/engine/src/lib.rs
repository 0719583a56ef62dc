//! The mutation core: the reducer, the workflow engine, `TaskService`,
//! the selector, the integrity checker, and hook dispatch. Everything
//! here is built on `lattice-storage`'s raw file I/O and
//! `lattice-core`'s data model.

pub mod hooks;
pub mod integrity;
pub mod reducer;
pub mod selector;
pub mod task_service;
pub mod workflow;

pub use integrity::{doctor, rebuild_all, rebuild_task, DoctorReport, RebuildReport};
pub use selector::next;
pub use task_service::{CallOptions, CreateTaskCmd, TaskService};
pub use workflow::{check_transition, compute_epic_derived_status, count_review_cycles, validate_status_change};
