//! `lattice emit` — spec's `x_*` custom event escape hatch.

use clap::Args;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Task ULID or short-ID alias
    pub id: String,

    /// Custom event type; must start with `x_`
    pub event_type: String,

    /// JSON payload (defaults to `{}`)
    #[arg(default_value = "{}")]
    pub data: String,

    #[command(flatten)]
    pub common: CommonOpts,
}

pub fn run(service: &TaskService, args: EmitArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        let data: serde_json::Value = serde_json::from_str(&args.data)
            .map_err(|e| lattice_core::LatticeError::invalid_input(format!("invalid JSON payload: {e}")))?;
        service.record_custom_event(&id, &args.event_type, data, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
