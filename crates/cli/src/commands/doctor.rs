//! `lattice doctor` — spec §4.10 integrity scan.

use clap::Args;
use lattice_core::LatticeError;
use lattice_engine::DoctorReport;

use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Truncate corrupt trailing lines found in event logs
    #[arg(long)]
    pub fix: bool,
}

pub(crate) fn all_task_ids(paths: &lattice_storage::ProjectPaths) -> Result<Vec<String>, LatticeError> {
    let dir = paths.root().join("events");
    let mut ids = Vec::new();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
        Err(e) => return Err(LatticeError::integrity_error(e.to_string())),
    };
    for entry in entries {
        let entry = entry.map_err(|e| LatticeError::integrity_error(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if stem != "_lifecycle" {
                ids.push(stem.to_string());
            }
        }
    }
    Ok(ids)
}

pub fn run(paths: &lattice_storage::ProjectPaths, config: &lattice_core::Config, args: DoctorArgs, format: OutputFormat) -> i32 {
    let result: Result<DoctorReport, LatticeError> = (|| {
        let task_ids = all_task_ids(paths)?;
        lattice_engine::doctor(paths, config, &task_ids, args.fix)
    })();

    crate::output::render(format, result, |report| {
        if report.is_clean() {
            println!("clean");
            return;
        }
        println!("{}", serde_json::to_string_pretty(report).unwrap_or_else(|_| "<unrenderable report>".to_string()));
    })
}
