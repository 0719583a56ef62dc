//! `lattice show` — resolves a short ID or ULID and prints the snapshot.

use clap::Args;
use lattice_engine::TaskService;

use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task ULID or short-ID alias (e.g. PROJ-12)
    pub id: String,
}

pub fn run(service: &TaskService, args: ShowArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        service.get(&id)
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
