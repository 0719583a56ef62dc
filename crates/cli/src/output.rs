//! Rendering: the `--output text|json` split every command honors, and
//! the envelope JSON shape (spec §6) that JSON mode always prints.

use clap::ValueEnum;
use lattice_core::{Envelope, LatticeError};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints a verb's result in the requested format and returns the
/// process exit code it implies (0 on success, 1 on failure) — callers
/// never need to inspect the `Result` themselves.
pub fn render<T, F>(format: OutputFormat, result: Result<T, LatticeError>, text: F) -> i32
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => {
            let envelope = Envelope::from_result(result);
            let json = envelope.to_json();
            // serde_json::Value serialization cannot fail.
            if let Ok(rendered) = serde_json::to_string_pretty(&json) {
                println!("{rendered}");
            }
            match envelope {
                Envelope::Ok { .. } => 0,
                Envelope::Err { .. } => 1,
            }
        }
        OutputFormat::Text => match result {
            Ok(data) => {
                text(&data);
                0
            }
            Err(err) => {
                eprintln!("{}: {}", crate::color::red(err.code.as_str()), err.message);
                if let Some(details) = &err.details {
                    eprintln!("{details}");
                }
                1
            }
        },
    }
}
