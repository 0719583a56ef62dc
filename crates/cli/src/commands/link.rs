//! `lattice link`/`lattice unlink` — spec §4's relationship verbs.

use clap::Args;
use lattice_core::Task;
use lattice_engine::TaskService;
use serde::Serialize;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Source task ULID or short-ID alias
    pub from: String,
    /// Relationship type, e.g. `blocks`, `relates_to`
    pub kind: String,
    /// Target task ULID or short-ID alias
    pub to: String,
    /// Free-form note on the relationship
    #[arg(long)]
    pub note: Option<String>,
    #[command(flatten)]
    pub common: CommonOpts,
}

#[derive(Args, Debug)]
pub struct UnlinkArgs {
    pub from: String,
    pub kind: String,
    pub to: String,
    #[command(flatten)]
    pub common: CommonOpts,
}

#[derive(Serialize)]
pub struct LinkResult {
    pub source: Task,
    pub target: Task,
}

pub fn run_link(service: &TaskService, args: LinkArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let from = service.resolve_id(&config, &args.from)?;
        let to = service.resolve_id(&config, &args.to)?;
        let (source, target) = service.link(&from, &args.kind, &to, args.note, args.common.into())?;
        Ok(LinkResult { source, target })
    })();

    crate::output::render(format, result, |r| crate::fmt::print_task_detail(&r.source))
}

pub fn run_unlink(service: &TaskService, args: UnlinkArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let from = service.resolve_id(&config, &args.from)?;
        let to = service.resolve_id(&config, &args.to)?;
        let (source, target) = service.unlink(&from, &args.kind, &to, args.common.into())?;
        Ok(LinkResult { source, target })
    })();

    crate::output::render(format, result, |r| crate::fmt::print_task_detail(&r.source))
}
