//! Command implementations for blocksync-cli

pub mod list;
pub mod show;
pub mod sync;

pub use list::run_list;
pub use show::run_show;
pub use sync::{run_check, run_sync};

use blocksync_fs::NormalizedPath;
use blocksync_meta::{Job, JobSet};

use crate::error::{CliError, Result};

/// Load the job file named by `--config`.
pub fn load_jobs(config: &str) -> Result<JobSet> {
    let path = NormalizedPath::new(config);
    if !path.exists() {
        return Err(CliError::user(format!(
            "job file {} not found (use --config to point at one)",
            path
        )));
    }
    Ok(JobSet::load(&path)?)
}

/// Resolve `--job` filters, turning unknown names into a user error.
pub fn select<'a>(jobs: &'a JobSet, names: &[String]) -> Result<Vec<&'a Job>> {
    jobs.select(names).map_err(|e| match e {
        blocksync_meta::Error::UnknownJob { name } => {
            let known: Vec<&str> = jobs.jobs().iter().map(|j| j.name()).collect();
            CliError::user(format!(
                "no job named {:?} in {} (known: {})",
                name,
                jobs.path(),
                known.join(", ")
            ))
        }
        other => other.into(),
    })
}
