//! `lattice status` — spec §4.5 `change_status` verb.

use clap::Args;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Task ULID or short-ID alias
    pub id: String,

    /// Target status
    pub to: String,

    /// Bypass the transition-graph and review-cycle checks; requires --reason
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub common: CommonOpts,
}

pub fn run(service: &TaskService, args: StatusArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        service.change_status(&id, &args.to, args.force, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
