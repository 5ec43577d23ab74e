//! Integration tests for the kickstartds binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]
#![cfg(unix)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(tasks: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let ks_dir = temp.path().join(".kickstartds");
    fs::create_dir_all(&ks_dir).unwrap();
    fs::write(ks_dir.join("tasks.yml"), tasks).unwrap();
    temp
}

fn kickstartds(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("kickstartds"));
    cmd.current_dir(temp.path())
        .env("KICKSTARTDS_TMP_DIR", temp.path().join("tmp"))
        .env_remove("KICKSTARTDS_INFLUX_URL")
        .env_remove("KICKSTARTDS_TASKS")
        .env("NO_COLOR", "1");
    cmd
}

const TASKS: &str = r#"
modules:
  tokens:
    compile:
      description: Compile design tokens
      prompts:
        - key: token.path
          question: Where are your tokens?
          default: ./tokens
      checks:
        - name: checkShell
          run: 'true'
      run:
        - name: compileTokens
          run: echo "compiling $KS_TOKEN_PATH"
      revert:
        - name: removeOutput
          run: echo reverted
    broken:
      run:
        - name: failHard
          run: exit 2
    missing:
      requires: [kickstartds-surely-not-installed]
      run:
        - name: never
          run: 'true'
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kickstartds"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--revert"))
        .stdout(predicate::str::contains("--rc-only"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kickstartds"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_module_and_command() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp).assert().failure();
    Ok(())
}

#[test]
fn cli_lists_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens compile"))
        .stdout(predicate::str::contains("Compile design tokens"));
    Ok(())
}

#[test]
fn cli_runs_forward_phase_non_interactively() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "compile", "--non-interactive", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compiling ./tokens"))
        .stdout(predicate::str::contains("Finished forward"));
    Ok(())
}

#[test]
fn cli_uses_saved_rc_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    fs::write(
        temp.path().join(".tokens-compilerc.yaml"),
        "token:\n  path: ./design\n",
    )?;

    kickstartds(&temp)
        .args(["tokens", "compile", "--rc-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compiling ./design"));
    Ok(())
}

#[test]
fn cli_save_rc_writes_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "compile", "--non-interactive", "--save-rc"])
        .assert()
        .success();

    let saved = fs::read_to_string(temp.path().join(".tokens-compilerc"))?;
    assert!(saved.contains("\"path\": \"./tokens\""));
    Ok(())
}

#[test]
fn cli_runs_revert_phase() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "compile", "--revert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reverted"))
        .stdout(predicate::str::contains("compiling").not());
    Ok(())
}

#[test]
fn cli_failing_step_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "broken"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Step 'fail-hard' failed"))
        .stderr(predicate::str::contains("Command exited with 2"));
    Ok(())
}

#[test]
fn cli_missing_prerequisite_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("kickstartds-surely-not-installed"));
    Ok(())
}

#[test]
fn cli_unknown_task_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["cms", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown task: cms init"));
    Ok(())
}

#[test]
fn cli_writes_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(TASKS);
    kickstartds(&temp)
        .args(["tokens", "compile", "--non-interactive", "--log-file"])
        .assert()
        .success();

    let log = fs::read_to_string(temp.path().join(".tokens-compilerc.log"))?;
    assert!(log.contains("compiling ./tokens"));
    Ok(())
}
