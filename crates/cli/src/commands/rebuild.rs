//! `lattice rebuild` — spec §4.10 rebuild-from-log.

use clap::Args;
use lattice_core::LatticeError;
use lattice_engine::RebuildReport;

use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct RebuildArgs;

pub fn run(paths: &lattice_storage::ProjectPaths, config: &lattice_core::Config, format: OutputFormat) -> i32 {
    let result: Result<RebuildReport, LatticeError> = (|| {
        let task_ids = super::doctor::all_task_ids(paths)?;
        lattice_engine::rebuild_all(paths, config, &task_ids)
    })();

    crate::output::render(format, result, |report| {
        println!(
            "rebuilt {} tasks, {} lifecycle events, {} short ids",
            report.tasks_rebuilt, report.lifecycle_events, report.short_ids_assigned
        );
    })
}
