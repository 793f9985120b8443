//! End-to-end tests that run the compiled `blocksync` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SETTINGS: &str = r#"val appLanguages = arrayListOf(
    /* begin language list */
    Triple("", "English", "en"),
    /* end language list */
)
"#;

const JOBS: &str = r##"
[[job]]
name = "app-languages"
document = "Settings.kt"
begin_marker = "/* begin language list */"
end_marker = "/* end language list */"
fields = ["flag", "name", "code"]
key = "code"
display = "name"
entry_pattern = 'Triple\("(?P<flag>[^"]*)", "(?P<name>[^"]*)", "(?P<code>[^"]*)"\)'
template = '    Triple("{flag}", "{name}", "{code}"),'
sort_by = "name"

[job.discover]
kind = "directory"
root = "res"
pattern = '^values-(?P<code>[a-z]{2,3})$'

[job.lookup]
path = "iso639.yaml"
"##;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("blocksync.toml"), JOBS).unwrap();
    fs::write(root.join("Settings.kt"), SETTINGS).unwrap();
    fs::write(root.join("iso639.yaml"), "nl: Dutch\n").unwrap();
    for dir in ["values", "values-en", "values-nl", "values-qq"] {
        fs::create_dir_all(root.join("res").join(dir)).unwrap();
    }
    temp
}

/// Get a Command for the blocksync binary running in `dir`
fn blocksync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("blocksync").expect("Failed to find blocksync binary");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("BLOCKSYNC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn settings(dir: &Path) -> String {
    fs::read_to_string(dir.join("Settings.kt")).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    blocksync(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_sync_rewrites_block() {
    let temp = project();
    blocksync(temp.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("SYNCED"))
        .stdout(predicate::str::contains("+2 added"))
        .stdout(predicate::str::contains("no display name for qq"));

    assert_eq!(
        settings(temp.path()),
        r#"val appLanguages = arrayListOf(
    /* begin language list */
    Triple("", "Dutch", "nl"),
    Triple("", "English", "en"),
    Triple("", "qq", "qq"),
    /* end language list */
)
"#
    );

    blocksync(temp.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_dry_run_prints_diff_without_writing() {
    let temp = project();
    blocksync(temp.path())
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would change"))
        .stdout(predicate::str::contains(r#"+    Triple("", "Dutch", "nl"),"#));

    assert_eq!(settings(temp.path()), SETTINGS);
}

#[test]
fn test_check_exit_codes() {
    let temp = project();
    blocksync(temp.path())
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("STALE"));
    assert_eq!(settings(temp.path()), SETTINGS);

    blocksync(temp.path()).arg("sync").assert().success();
    blocksync(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_json_report() {
    let temp = project();
    let output = blocksync(temp.path())
        .args(["sync", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["changed"], true);
    let job = &report["jobs"][0];
    assert_eq!(job["job"], "app-languages");
    assert_eq!(job["report"]["added"], serde_json::json!(["nl", "qq"]));
    assert_eq!(job["report"]["lookup_misses"], serde_json::json!(["qq"]));
    assert!(
        job["report"]["checksum_after"]
            .as_str()
            .unwrap()
            .starts_with("sha256:")
    );
}

#[test]
fn test_unknown_job_is_user_error() {
    let temp = project();
    blocksync(temp.path())
        .args(["sync", "--job", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no job named \"nope\""));
    assert_eq!(settings(temp.path()), SETTINGS);
}

#[test]
fn test_marker_violation_fails_without_writing() {
    let temp = project();
    let broken = SETTINGS.replace("    /* end language list */\n", "");
    fs::write(temp.path().join("Settings.kt"), &broken).unwrap();

    blocksync(temp.path())
        .arg("sync")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("end language list"));
    assert_eq!(settings(temp.path()), broken);
}

#[test]
fn test_missing_job_file() {
    let temp = TempDir::new().unwrap();
    blocksync(temp.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_flag_and_list() {
    let temp = project();
    let nested = temp.path().join("ci");
    fs::create_dir_all(&nested).unwrap();
    fs::rename(temp.path().join("blocksync.toml"), nested.join("jobs.toml")).unwrap();
    fs::write(
        nested.join("jobs.toml"),
        JOBS.replace("\"Settings.kt\"", "\"../Settings.kt\"")
            .replace("\"res\"", "\"../res\"")
            .replace("\"iso639.yaml\"", "\"../iso639.yaml\""),
    )
    .unwrap();

    blocksync(temp.path())
        .args(["list", "--config", "ci/jobs.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app-languages"))
        .stdout(predicate::str::contains("discover: directory"));

    blocksync(temp.path())
        .args(["sync", "-c", "ci/jobs.toml"])
        .assert()
        .success();
    assert!(settings(temp.path()).contains("\"Dutch\", \"nl\""));
}

#[test]
fn test_show_entries() {
    let temp = project();
    blocksync(temp.path())
        .args(["show", "--job", "app-languages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 entries)"))
        .stdout(predicate::str::contains("en flag=\"\" name=\"English\""));

    let output = blocksync(temp.path())
        .args(["show", "--json"])
        .output()
        .unwrap();
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        shown[0]["entries"][0],
        serde_json::json!({"flag": "", "name": "English", "code": "en"})
    );
}
