//! `lattice archive`/`lattice unarchive` — spec §4's archival verbs.

use clap::Args;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Task ULID or short-ID alias
    pub id: String,
    #[command(flatten)]
    pub common: CommonOpts,
}

#[derive(Args, Debug)]
pub struct UnarchiveArgs {
    pub id: String,
    #[command(flatten)]
    pub common: CommonOpts,
}

pub fn run_archive(service: &TaskService, args: ArchiveArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        service.archive(&id, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}

pub fn run_unarchive(service: &TaskService, args: UnarchiveArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        service.unarchive(&id, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
