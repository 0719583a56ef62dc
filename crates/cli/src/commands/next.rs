//! `lattice next`/`lattice claim` — spec §4.9 selector verbs.

use clap::Args;
use lattice_core::LatticeError;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Restrict to tasks assignable to this actor (in-flight work assigned to them first)
    #[arg(long)]
    pub actor: Option<String>,

    /// Override the default ready-set status pool (backlog, planned)
    #[arg(long = "status")]
    pub statuses: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Acting identity to claim the task for
    pub actor: String,

    /// Override the default ready-set status pool (backlog, planned)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    #[command(flatten)]
    pub common: CommonOpts,
}

fn pool(statuses: &[String]) -> Option<Vec<&str>> {
    if statuses.is_empty() {
        None
    } else {
        Some(statuses.iter().map(String::as_str).collect())
    }
}

pub fn run_next(service: &TaskService, args: NextArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let pool = pool(&args.statuses);
        service
            .peek_next(args.actor.as_deref(), pool.as_deref())?
            .ok_or_else(|| LatticeError::nothing_to_claim("no eligible task"))
    })();

    crate::output::render(format, result, crate::fmt::print_task_line)
}

pub fn run_claim(service: &TaskService, args: ClaimArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let pool = pool(&args.statuses);
        service.claim(&args.actor, pool.as_deref(), args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
