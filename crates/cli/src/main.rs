//! lattice — a file-based, event-sourced task tracker. Thin CLI client
//! over `lattice-engine::TaskService`; see spec §6 for the verb/envelope
//! contract this binary exists to exercise.

mod color;
mod commands;
mod fmt;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{
    archive, artifact, assign, comment, create, doctor, emit, init, link, next, rebuild, show, status, update,
};
use lattice_core::{MonotonicClock, MonotonicUlidGen, SystemClock};
use lattice_engine::TaskService;
use lattice_storage::ProjectPaths;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "lattice", version, about = "Lattice - a file-based, event-sourced task tracker", styles = color::styles())]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', long = "chdir", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh .lattice/ state directory
    Init(init::InitArgs),
    /// Create a task
    Create(create::CreateArgs),
    /// Show a task's current snapshot
    Show(show::ShowArgs),
    /// Update a single field by dot-path
    Update(update::UpdateArgs),
    /// Change a task's status
    Status(status::StatusArgs),
    /// Assign (or unassign) a task
    Assign(assign::AssignArgs),
    /// Comment on a task
    Comment(comment::CommentArgs),
    /// Link one task to another
    Link(link::LinkArgs),
    /// Remove a relationship between two tasks
    Unlink(link::UnlinkArgs),
    /// Attach an artifact to a task
    Attach(artifact::AttachArgs),
    /// Archive a task
    Archive(archive::ArchiveArgs),
    /// Unarchive a task
    Unarchive(archive::UnarchiveArgs),
    /// Preview the next task the selector would pick, without claiming it
    Next(next::NextArgs),
    /// Atomically assign and advance the next eligible task to in_progress
    Claim(next::ClaimArgs),
    /// Scan the store for drift and corruption
    Doctor(doctor::DoctorArgs),
    /// Rebuild every snapshot and index from the event logs
    Rebuild(rebuild::RebuildArgs),
    /// Record a custom x_* event on a task
    Emit(emit::EmitArgs),
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let format = cli.output;

    let cwd = match cli.directory {
        Some(dir) => std::fs::canonicalize(&dir).with_context(|| format!("cannot change to directory {}", dir.display()))?,
        None => std::env::current_dir().context("cannot read current directory")?,
    };

    if let Commands::Init(args) = cli.command {
        return Ok(init::run(args, &cwd, format));
    }

    let service = match build_service(&cwd) {
        Ok(service) => service,
        Err(e) => return Ok(output::render::<(), _>(format, Err(e), |_| {})),
    };

    Ok(dispatch(&service, cli.command, format))
}

fn build_service(cwd: &std::path::Path) -> Result<TaskService, lattice_core::LatticeError> {
    let paths = ProjectPaths::discover(cwd)?;
    let id_gen = Arc::new(MonotonicUlidGen::new());
    let clock = Arc::new(MonotonicClock::new(SystemClock));
    Ok(TaskService::new(paths, id_gen, clock))
}

fn dispatch(service: &TaskService, command: Commands, format: OutputFormat) -> i32 {
    match command {
        Commands::Init(_) => {
            // main() handles Init before a project is discovered; this
            // arm only exists for match exhaustiveness.
            output::render::<(), _>(format, Err(lattice_core::LatticeError::invalid_input("init dispatched twice")), |_| {})
        }
        Commands::Create(args) => create::run(service, args, format),
        Commands::Show(args) => show::run(service, args, format),
        Commands::Update(args) => update::run(service, args, format),
        Commands::Status(args) => status::run(service, args, format),
        Commands::Assign(args) => assign::run(service, args, format),
        Commands::Comment(args) => comment::run(service, args, format),
        Commands::Link(args) => link::run_link(service, args, format),
        Commands::Unlink(args) => link::run_unlink(service, args, format),
        Commands::Attach(args) => artifact::run(service, args, format),
        Commands::Archive(args) => archive::run_archive(service, args, format),
        Commands::Unarchive(args) => archive::run_unarchive(service, args, format),
        Commands::Next(args) => next::run_next(service, args, format),
        Commands::Claim(args) => next::run_claim(service, args, format),
        Commands::Doctor(args) => {
            let config = match service.config() {
                Ok(c) => c,
                Err(e) => return output::render::<(), _>(format, Err(e), |_| {}),
            };
            doctor::run(service.paths(), &config, args, format)
        }
        Commands::Rebuild(_) => {
            let config = match service.config() {
                Ok(c) => c,
                Err(e) => return output::render::<(), _>(format, Err(e), |_| {}),
            };
            rebuild::run(service.paths(), &config, format)
        }
        Commands::Emit(args) => emit::run(service, args, format),
    }
}
