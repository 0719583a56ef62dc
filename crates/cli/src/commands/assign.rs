//! `lattice assign` — spec §4.6 `assign` verb.

use clap::Args;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Task ULID or short-ID alias
    pub id: String,

    /// Actor to assign the task to; omit to unassign
    pub assignee: Option<String>,

    #[command(flatten)]
    pub common: CommonOpts,
}

pub fn run(service: &TaskService, args: AssignArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        service.assign(&id, args.assignee, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
