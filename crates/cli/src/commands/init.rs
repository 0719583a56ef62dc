//! `lattice init` — creates a fresh `.lattice/` state directory.

use clap::Args;
use lattice_core::{Config, LatticeError};
use lattice_storage::{ConfigService, ProjectPaths};
use serde::Serialize;

use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Short project code used for short-ID aliases, e.g. `PROJ` -> `PROJ-1`
    #[arg(long)]
    pub project_code: Option<String>,
}

#[derive(Serialize)]
pub struct InitResult {
    pub root: String,
}

pub fn run(args: InitArgs, dir: &std::path::Path, format: OutputFormat) -> i32 {
    let result = (|| -> Result<InitResult, LatticeError> {
        let paths = ProjectPaths::init(dir)?;
        if let Some(project_code) = args.project_code {
            let mut config = Config::default();
            config.project_code = Some(project_code);
            ConfigService::new(&paths).save(&config)?;
        }
        Ok(InitResult {
            root: paths.root().display().to_string(),
        })
    })();

    crate::output::render(format, result, |r| {
        println!("initialized {}", r.root);
    })
}
