//! End-to-end tests for the stepbuild binary.
//!
//! Builds here never reach a real interpreter: the configured python is a
//! name that cannot exist, so the pipeline always stops at its first step.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const MISSING_PYTHON: &str = "stepbuild-no-such-python-3f9a";

fn stepbuild(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stepbuild").unwrap();
    cmd.current_dir(dir);
    cmd
}

/// Temp project whose interpreter is missing.
fn broken_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("stepbuild.toml"),
        format!(
            r#"
[project]
name = "helper"
entry_file = "app.py"

[environment]
python = "{}"

[verify]
required = ["dist/app.dist"]
"#,
            MISSING_PYTHON
        ),
    )
    .unwrap();
    temp
}

fn read_log(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("build.log")).unwrap()
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    stepbuild(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn setup_writes_config_once() {
    let temp = TempDir::new().unwrap();

    stepbuild(temp.path())
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("created successfully"));
    assert!(temp.path().join("stepbuild.toml").is_file());

    stepbuild(temp.path())
        .arg("setup")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    stepbuild(temp.path())
        .args(["setup", "--force"])
        .assert()
        .success();
}

#[test]
fn build_without_config_fails() {
    let temp = TempDir::new().unwrap();

    stepbuild(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stepbuild setup"));
}

#[test]
fn failing_step_exits_one_and_stops() {
    let temp = broken_project();

    stepbuild(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("started step check environment"))
        .stdout(predicate::str::contains("step check environment failed"));

    let log = read_log(temp.path());
    assert!(log.contains("[INFO]: started step check environment"));
    assert!(log.contains("[ERROR]: step check environment failed, duration 00:00:"));
    assert!(!log.contains("started step setup virtual environment"));
    assert!(!temp.path().join(".venv").exists());
}

#[test]
fn console_and_log_file_agree() {
    let temp = broken_project();

    let output = stepbuild(temp.path()).arg("build").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let log = read_log(temp.path());
    let console_lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with('[')).collect();
    let file_lines: Vec<&str> = log.lines().collect();
    assert_eq!(console_lines, file_lines);
}

#[test]
fn version_defaults_and_overrides() {
    let temp = broken_project();

    stepbuild(temp.path()).arg("build").assert().code(1);
    stepbuild(temp.path()).args(["build", "v2.5.0"]).assert().code(1);

    let log = read_log(temp.path());
    let headers: Vec<&str> = log.lines().filter(|l| l.contains("building helper")).collect();
    assert_eq!(headers.len(), 2);
    assert!(headers[0].ends_with("building helper version 1.0.0"));
    assert!(headers[1].ends_with("building helper version v2.5.0"));
}

#[test]
fn report_records_failed_step() {
    let temp = broken_project();

    stepbuild(temp.path())
        .args(["build", "--report", "out/report.json"])
        .assert()
        .code(1);

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp.path().join("out").join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["status"], "failed");
    assert_eq!(report["step"], "check environment");
    assert_eq!(report["steps"].as_array().unwrap().len(), 1);
}

#[test]
fn check_reports_missing_interpreter() {
    let temp = broken_project();

    stepbuild(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(MISSING_PYTHON))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn usage_errors_exit_one() {
    let temp = TempDir::new().unwrap();

    stepbuild(temp.path())
        .args(["build", "--bogus"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"));

    stepbuild(temp.path()).assert().code(1);

    stepbuild(temp.path()).arg("--version").assert().success();
}

#[test]
fn relative_report_path_follows_working_directory() {
    let temp = broken_project();
    let sub = temp.path().join("sub");
    std::fs::create_dir_all(&sub).unwrap();
    std::fs::rename(temp.path().join("stepbuild.toml"), sub.join("stepbuild.toml")).unwrap();

    stepbuild(temp.path())
        .args(["build", "-c", "sub/stepbuild.toml", "--report", "r.json"])
        .assert()
        .code(1);

    assert!(temp.path().join("r.json").is_file());
    assert!(!sub.join("r.json").exists());
    assert!(sub.join("build.log").is_file());
}
