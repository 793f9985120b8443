//! List command implementation

use colored::Colorize;

use super::load_jobs;
use crate::error::Result;

/// Run the list command
pub fn run_list(config: &str) -> Result<()> {
    let jobs = load_jobs(config)?;

    println!("{} {}", "Jobs in".bold(), jobs.path().as_str().yellow());
    println!();
    for job in jobs.jobs() {
        let schema = job.schema();
        println!(
            "  {} {} {}",
            job.name().cyan().bold(),
            "->".dimmed(),
            job.document()
        );
        println!(
            "      discover: {}, key: {}, fields: {}",
            job.discover_kind(),
            schema.key_field(),
            schema.fields().join(", ")
        );
    }
    Ok(())
}
