//! `lattice attach` — spec §4.11 `attach` verb.

use clap::Args;
use lattice_core::{Artifact, ArtifactSource, Task};
use lattice_engine::TaskService;
use serde::Serialize;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Task ULID or short-ID alias
    pub id: String,

    /// file, url, conversation, prompt, log, or reference
    #[arg(long = "source", default_value = "file")]
    pub source: String,

    /// Path to the file to copy in (required when --source=file)
    #[arg(long = "path")]
    pub file_path: Option<std::path::PathBuf>,

    /// Reference string: the URL, conversation id, or other pointer (defaults to --path for file sources)
    #[arg(long = "ref")]
    pub payload_ref: Option<String>,

    /// Evidence role this artifact satisfies, e.g. `review`
    #[arg(long)]
    pub role: Option<String>,

    /// Mark the artifact as containing sensitive content
    #[arg(long)]
    pub sensitive: bool,

    #[command(flatten)]
    pub common: CommonOpts,
}

#[derive(Serialize)]
pub struct AttachResult {
    pub task: Task,
    pub artifact: Artifact,
}

fn parse_source(raw: &str) -> Result<ArtifactSource, lattice_core::LatticeError> {
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map_err(|_| lattice_core::LatticeError::invalid_input(format!("invalid artifact source {raw:?}")))
}

pub fn run(service: &TaskService, args: AttachArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let config = service.config()?;
        let id = service.resolve_id(&config, &args.id)?;
        let source = parse_source(&args.source)?;

        let payload_ref = args
            .payload_ref
            .clone()
            .or_else(|| args.file_path.as_ref().map(|p| p.display().to_string()))
            .ok_or_else(|| lattice_core::LatticeError::invalid_input("one of --ref or --path is required"))?;

        let (task, artifact) = service.attach(
            &id,
            source,
            args.file_path.as_deref(),
            payload_ref,
            args.role,
            args.sensitive,
            args.common.into(),
        )?;
        Ok(AttachResult { task, artifact })
    })();

    crate::output::render(format, result, |r| {
        crate::fmt::print_task_detail(&r.task);
        println!();
        println!("attached artifact {}", r.artifact.id);
    })
}
