//! blocksync CLI
//!
//! Drives the jobs declared in a `blocksync.toml` job file.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command finished but the exit code must be 1.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!(config = %cli.config, "starting");

    let config = cli.config.as_str();
    match cli.command {
        Commands::Sync {
            dry_run,
            json,
            filter,
        } => commands::run_sync(config, &filter.jobs, dry_run, json),
        Commands::Check { json, filter } => commands::run_check(config, &filter.jobs, json),
        Commands::List => commands::run_list(config).map(|()| true),
        Commands::Show { json, filter } => {
            commands::run_show(config, &filter.jobs, json).map(|()| true)
        }
    }
}
