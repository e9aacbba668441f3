//! CLI smoke tests for taskdeck-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and basic command functionality.

use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Helper to run the taskdeck-server binary with given arguments
fn run_taskdeck_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_taskdeck-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute taskdeck-server")
}

fn write_minimal_config(dir: &TempDir) -> std::path::PathBuf {
    let home = dir.path().join("home");
    let config_path = dir.path().join("config.yaml");
    let yaml = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 18087

logging:
  default:
    console_level: error
    file: ""
"#,
        home.to_string_lossy().replace('\\', "/")
    );
    std::fs::write(&config_path, yaml).expect("write config");
    config_path
}

#[test]
fn test_cli_help_command() {
    let output = run_taskdeck_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("taskdeck-server") || stdout.contains("Taskdeck"),
        "Should contain binary name"
    );
    assert!(
        stdout.contains("Usage:") || stdout.contains("USAGE:"),
        "Should contain usage information"
    );
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(
        stdout.contains("check"),
        "Should contain 'check' subcommand"
    );
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_taskdeck_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("taskdeck-server"),
        "Should contain binary name"
    );
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_taskdeck_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_check_command_with_valid_config() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = write_minimal_config(&dir);

    let output = run_taskdeck_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(
        output.status.success(),
        "Check should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn test_print_config_exits_before_running() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = write_minimal_config(&dir);

    let output = run_taskdeck_server(&[
        "--config",
        config_path.to_str().unwrap(),
        "--print-config",
    ]);

    assert!(output.status.success(), "print-config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server:"));
    assert!(stdout.contains("port: 18087"));
}
