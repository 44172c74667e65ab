// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod cli;
mod commands;
mod error;
mod notifier;

#[cfg(test)]
mod tests;

use clap::Parser;
use serde::Serialize;
use shift_swap::WorkflowConfig;
use shift_swap_persistence::{PersistenceError, SqliteStore};
use std::process::ExitCode;
use tracing::{error, info};

use crate::cli::Cli;
use crate::commands::App;
use crate::error::CliError;

/// Error report printed to stderr.
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: bool,
    kind: &'a str,
    message: String,
}

fn open_store(database: Option<&str>) -> Result<SqliteStore, PersistenceError> {
    if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path);
        SqliteStore::new_with_file(db_path)
    } else {
        info!("Using in-memory database");
        SqliteStore::new_in_memory()
    }
}

fn run(args: Cli) -> Result<String, CliError> {
    let store: SqliteStore = open_store(args.database.as_deref())?;
    let app = App::new(store, WorkflowConfig::new(args.utc_offset));
    let value = app.execute(args.command)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn main() -> ExitCode {
    let args: Cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Command failed: {}", err);
            let report = ErrorResponse {
                error: true,
                kind: err.kind(),
                message: err.to_string(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err}"),
            }
            ExitCode::FAILURE
        }
    }
}
