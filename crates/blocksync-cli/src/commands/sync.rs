//! Sync and check command implementations

use colored::Colorize;
use serde_json::{Value, json};

use blocksync_core::{SyncReport, WriteMode};
use blocksync_fs::RobustnessConfig;
use blocksync_meta::Job;

use super::{load_jobs, select};
use crate::error::Result;

/// Outcome of one job; failures do not stop the remaining jobs.
struct JobRun<'a> {
    job: &'a Job,
    result: std::result::Result<SyncReport, blocksync_meta::Error>,
}

impl JobRun<'_> {
    fn to_json(&self) -> Value {
        match &self.result {
            Ok(report) => json!({ "job": self.job.name(), "ok": true, "report": report }),
            Err(e) => json!({ "job": self.job.name(), "ok": false, "error": e.to_string() }),
        }
    }
}

fn execute<'a>(jobs: &[&'a Job], mode: WriteMode) -> Vec<JobRun<'a>> {
    jobs.iter()
        .map(|&job| JobRun {
            job,
            result: job.run(mode, RobustnessConfig::default()),
        })
        .collect()
}

fn print_json(runs: &[JobRun<'_>], changed: bool, success: bool) -> Result<()> {
    let output = json!({
        "jobs": runs.iter().map(JobRun::to_json).collect::<Vec<_>>(),
        "changed": changed,
        "success": success,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run the sync command
///
/// Returns `false` when any job failed.
pub fn run_sync(config: &str, names: &[String], dry_run: bool, json: bool) -> Result<bool> {
    let jobs = load_jobs(config)?;
    let selected = select(&jobs, names)?;
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Apply
    };

    let runs = execute(&selected, mode);
    let success = runs.iter().all(|r| r.result.is_ok());
    let changed = runs
        .iter()
        .any(|r| r.result.as_ref().is_ok_and(|report| report.changed));

    if json {
        print_json(&runs, changed, success)?;
        return Ok(success);
    }

    for run in &runs {
        match &run.result {
            Ok(report) => print_sync_report(run.job, report, dry_run),
            Err(e) => print_failure(run.job, e),
        }
    }
    Ok(success)
}

/// Run the check command
///
/// Returns `false` when any job is stale or failed.
pub fn run_check(config: &str, names: &[String], json: bool) -> Result<bool> {
    let jobs = load_jobs(config)?;
    let selected = select(&jobs, names)?;

    let runs = execute(&selected, WriteMode::DryRun);
    let failed = runs.iter().any(|r| r.result.is_err());
    let stale = runs
        .iter()
        .any(|r| r.result.as_ref().is_ok_and(|report| report.changed));

    if json {
        print_json(&runs, stale, !failed)?;
        return Ok(!failed && !stale);
    }

    for run in &runs {
        match &run.result {
            Ok(report) if report.changed => {
                println!(
                    "{} {}: {} is out of date ({})",
                    "STALE".red().bold(),
                    run.job.name().cyan(),
                    report.document,
                    summary(report)
                );
            }
            Ok(report) => {
                println!(
                    "{} {}: {} is up to date",
                    "OK".green().bold(),
                    run.job.name().cyan(),
                    report.document
                );
            }
            Err(e) => print_failure(run.job, e),
        }
    }

    if stale {
        println!();
        println!("Run {} to update.", "blocksync sync".cyan());
    }
    Ok(!failed && !stale)
}

fn summary(report: &SyncReport) -> String {
    format!(
        "+{} added, ~{} updated, -{} pruned",
        report.added.len(),
        report.updated.len(),
        report.pruned.len()
    )
}

fn print_sync_report(job: &Job, report: &SyncReport, dry_run: bool) {
    if !report.changed {
        println!(
            "{} {}: {} is up to date ({} entries)",
            "OK".green().bold(),
            job.name().cyan(),
            report.document,
            report.entries
        );
    } else if dry_run {
        println!(
            "{} {}: {} would change ({})",
            "DRY-RUN".yellow().bold(),
            job.name().cyan(),
            report.document,
            summary(report)
        );
        if let Some(diff) = &report.diff {
            print_diff(&diff.unified);
        }
    } else {
        println!(
            "{} {}: {} ({})",
            "SYNCED".green().bold(),
            job.name().cyan(),
            report.document,
            summary(report)
        );
    }

    for key in &report.lookup_misses {
        println!(
            "   {} no display name for {}, using the key",
            "!".yellow(),
            key.cyan()
        );
    }
    for skipped in &report.skipped {
        println!(
            "   {} skipped {}: {}",
            "-".yellow(),
            skipped.origin,
            skipped.reason.dimmed()
        );
    }
}

fn print_diff(unified: &str) {
    println!();
    for line in unified.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

fn print_failure(job: &Job, error: &blocksync_meta::Error) {
    eprintln!(
        "{} {}: {}",
        "FAILED".red().bold(),
        job.name().cyan(),
        error
    );
}
