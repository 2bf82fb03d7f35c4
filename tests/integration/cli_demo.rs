//! Integration tests for the apictx binary

use std::process::Command;
use tempfile::TempDir;

fn apictx(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_apictx"));
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("APICTX_LOG")
        .arg("--quiet");
    cmd
}

#[test]
fn test_demo_reports_worker_results() {
    let temp_dir = TempDir::new().unwrap();
    let output = apictx(&temp_dir)
        .args(["demo", "--workers", "2"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "demo should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("expected failure: Api:[prepare]:'string' can't convert to 'int'"));
    assert!(stdout.contains("worker-0 (request demo-1) -> 0"));
    assert!(stdout.contains("worker-1 (request demo-1) -> 1"));
    assert!(!stdout.contains("errors:"));
}

#[test]
fn test_demo_with_failures_prints_chains() {
    let temp_dir = TempDir::new().unwrap();
    let output = apictx(&temp_dir)
        .args(["demo", "--workers", "2", "--fail"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("prepare reported:\nApi:[prepare]:input rejected;Obj: 2"));
    assert!(stdout.contains(
        "worker-1 errors:\nApi:[worker-1]:;Obj: worker 1 lost its input\nApi:[worker-1]:giving up;Obj: <nil>"
    ));
}

#[test]
fn test_config_command_prints_toml() {
    let temp_dir = TempDir::new().unwrap();
    let output = apictx(&temp_dir).arg("config").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[runtime]"));
    assert!(stdout.contains("default_func_name = \"AnonymousFunction\""));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = apictx(&temp_dir)
        .args(["--config", "/definitely/not/here.toml", "config"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
}
