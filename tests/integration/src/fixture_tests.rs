//! Workspace-level tests against the `test-fixtures/android-app` project.
//!
//! The fixture is copied into a temporary directory and every job in its
//! `blocksync.toml` runs through the same path the CLI uses.

use std::fs;
use std::path::{Path, PathBuf};

use blocksync_core::WriteMode;
use blocksync_fs::{NormalizedPath, RobustnessConfig};
use blocksync_meta::{JOB_FILE_NAME, JobSet};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SETTINGS: &str = "app/src/main/java/com/example/settings/SettingsLang.kt";

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/android-app")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for item in fs::read_dir(from).unwrap() {
        let item = item.unwrap();
        let target = to.join(item.file_name());
        if item.file_type().unwrap().is_dir() {
            copy_dir(&item.path(), &target);
        } else {
            fs::copy(item.path(), &target).unwrap();
        }
    }
}

fn setup() -> (TempDir, JobSet) {
    let temp = TempDir::new().unwrap();
    copy_dir(&fixture_root(), temp.path());
    let jobs = JobSet::load(&NormalizedPath::new(temp.path().join(JOB_FILE_NAME))).unwrap();
    (temp, jobs)
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn test_fixture_jobs_load() {
    let (_temp, jobs) = setup();
    let names: Vec<&str> = jobs.jobs().iter().map(|j| j.name()).collect();
    assert_eq!(names, vec!["app-languages", "sites"]);
}

#[test]
fn test_languages_from_resource_directories() {
    let (temp, jobs) = setup();
    let selected = jobs.select(&["app-languages".to_string()]).unwrap();
    let job = selected[0];

    let report = job.run(WriteMode::Apply, RobustnessConfig::default()).unwrap();
    assert_eq!(report.added, vec!["de".to_string(), "pt".to_string()]);
    assert!(report.updated.is_empty());
    assert!(report.lookup_misses.is_empty());

    assert_eq!(
        read(temp.path(), SETTINGS),
        r#"package com.example.settings

val appLanguages = arrayListOf(
    /* begin language list */
    Triple("", "Deutsch", "de"),
    Triple("🇬🇧", "English", "en"),
    Triple("", "Nederlands", "nl"),
    Triple("", "Português", "pt"),
    /* end language list */
).sortedBy { it.second.lowercase() }
"#
    );
}

#[test]
fn test_sites_from_provider_sources() {
    let (temp, jobs) = setup();
    let selected = jobs.select(&["sites".to_string()]).unwrap();
    let job = selected[0];

    let report = job.run(WriteMode::Apply, RobustnessConfig::default()).unwrap();
    assert_eq!(report.added, vec!["zeta".to_string()]);
    assert_eq!(report.updated, vec!["Alpha".to_string()]);
    assert_eq!(report.pruned, vec!["Retired".to_string()]);

    assert_eq!(
        read(temp.path(), "README.md"),
        "# Example\n\n## Supported sites\n\n<!--SITE LIST START-->\n\
         - [Alpha](https://alpha.example)\n\
         - [zeta](https://zeta.example)\n\
         <!--SITE LIST END-->\n\nContributions welcome.\n"
    );
}

#[test]
fn test_all_jobs_converge() {
    let (temp, jobs) = setup();
    for job in jobs.jobs() {
        job.run(WriteMode::Apply, RobustnessConfig::default()).unwrap();
    }
    let settings = read(temp.path(), SETTINGS);
    let readme = read(temp.path(), "README.md");

    for job in jobs.jobs() {
        let report = job.run(WriteMode::DryRun, RobustnessConfig::default()).unwrap();
        assert!(!report.changed, "{} is not idempotent", job.name());
        assert_eq!(report.checksum_before, report.checksum_after);
    }
    assert_eq!(read(temp.path(), SETTINGS), settings);
    assert_eq!(read(temp.path(), "README.md"), readme);
}

#[test]
fn test_dry_run_leaves_fixture_untouched() {
    let (temp, jobs) = setup();
    let before = read(temp.path(), "README.md");

    let report = jobs.jobs()[1]
        .run(WriteMode::DryRun, RobustnessConfig::default())
        .unwrap();
    assert!(report.changed);
    assert!(!report.written);
    let diff = report.diff.unwrap();
    assert!(diff.unified.contains("-- [Retired](https://retired.example)"));
    assert!(diff.unified.contains("+- [zeta](https://zeta.example)"));
    assert_eq!(read(temp.path(), "README.md"), before);
}
