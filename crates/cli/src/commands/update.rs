//! `lattice update` — spec §4.4 `update` verb (dot-path field update).

use clap::Args;
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Task ULID or short-ID alias
    pub id: String,

    /// Dot-separated field path, e.g. `custom_fields.estimate`
    pub path: String,

    /// New value, parsed as JSON when possible, otherwise treated as a string
    pub value: String,

    #[command(flatten)]
    pub common: CommonOpts,
}

pub fn run(service: &TaskService, args: UpdateArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        let path: Vec<String> = args.path.split('.').map(str::to_string).collect();
        let value = serde_json::from_str(&args.value).unwrap_or_else(|_| serde_json::Value::String(args.value.clone()));
        service.update(&id, path, value, args.common.into())
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
