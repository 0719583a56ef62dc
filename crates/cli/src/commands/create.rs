//! `lattice create` — spec §4.1 `create` verb.

use std::collections::BTreeMap;

use clap::Args;
use lattice_core::{Priority, Urgency};
use lattice_engine::{CreateTaskCmd, TaskService};

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Task title
    pub title: String,

    /// Free-form description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Task type, e.g. task, epic, bug (config.task_types)
    #[arg(long = "type", default_value = "task")]
    pub task_type: String,

    /// critical, high, medium, or low
    #[arg(long)]
    pub priority: Option<String>,

    /// immediate, high, normal, or low
    #[arg(long)]
    pub urgency: Option<String>,

    /// Actor to assign the task to at creation time
    #[arg(long)]
    pub assign: Option<String>,

    /// Repeatable tag
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Repeatable key=value custom field (value parsed as JSON, falling back to a string)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub common: CommonOpts,
}

fn parse_enum<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, lattice_core::LatticeError> {
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map_err(|_| lattice_core::LatticeError::invalid_input(format!("invalid value {raw:?}")))
}

fn parse_fields(raw: &[String]) -> Result<BTreeMap<String, serde_json::Value>, lattice_core::LatticeError> {
    let mut out = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            lattice_core::LatticeError::invalid_input(format!("--field {entry:?} is not key=value"))
        })?;
        let parsed = serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        out.insert(key.to_string(), parsed);
    }
    Ok(out)
}

pub fn run(service: &TaskService, args: CreateArgs, format: OutputFormat) -> i32 {
    let result = (|| {
        let priority = args.priority.as_deref().map(parse_enum::<Priority>).transpose()?;
        let urgency = args.urgency.as_deref().map(parse_enum::<Urgency>).transpose()?;
        let custom_fields = parse_fields(&args.fields)?;

        service.create(
            CreateTaskCmd {
                title: args.title,
                description: args.description,
                task_type: args.task_type,
                priority,
                urgency,
                assigned_to: args.assign,
                tags: args.tags,
                custom_fields,
            },
            args.common.into(),
        )
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
