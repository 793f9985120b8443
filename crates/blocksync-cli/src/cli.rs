//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};

/// blocksync - Keep marker-delimited blocks in sync with what is on disk
#[derive(Parser, Debug)]
#[command(name = "blocksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the job file
    #[arg(
        short,
        long,
        global = true,
        env = "BLOCKSYNC_CONFIG",
        default_value = blocksync_meta::JOB_FILE_NAME
    )]
    pub config: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Restrict a command to some jobs.
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFilter {
    /// Only run the named job (repeatable); all jobs when omitted
    #[arg(short, long = "job", value_name = "NAME")]
    pub jobs: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Rewrite every managed block from what discovery finds
    ///
    /// Examples:
    ///   blocksync sync                      # all jobs
    ///   blocksync sync --job app-languages  # one job
    ///   blocksync sync --dry-run            # show the diff, write nothing
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: JobFilter,
    },

    /// Report jobs whose block is out of date (exit code 1 if any)
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: JobFilter,
    },

    /// List configured jobs
    List,

    /// Print the entries currently in a job's block
    Show {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: JobFilter,
    },
}
