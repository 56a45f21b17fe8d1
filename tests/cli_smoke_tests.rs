//! CLI smoke tests for the vetter binary
//!
//! Exercises argument handling: help, version, unknown commands, and
//! missing required arguments.

use std::process::Command;

fn bin_path() -> String {
    std::env::var("CARGO_BIN_EXE_vetter").unwrap_or_else(|_| {
        let mut path = std::env::current_exe().unwrap();
        path.pop();
        path.pop();
        path.push("vetter");
        path.to_str().unwrap().to_string()
    })
}

#[test]
fn test_help_prints_usage_and_exits_zero() {
    let output = Command::new(bin_path())
        .arg("--help")
        .output()
        .expect("Failed to run vetter");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("vetter <command>"));
    assert!(stderr.contains("check"));
    assert!(stderr.contains("convert"));
    assert!(stderr.contains("checkers"));
}

#[test]
fn test_version_prints_package_version() {
    let output = Command::new(bin_path())
        .arg("--version")
        .output()
        .expect("Failed to run vetter");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("vetter "));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails_with_usage() {
    let output = Command::new(bin_path())
        .arg("frobnicate")
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown command"));
}

#[test]
fn test_no_arguments_fails() {
    let output = Command::new(bin_path())
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
}

#[test]
fn test_check_requires_commands_argument() {
    let output = Command::new(bin_path())
        .args(["check", "--workspace", "/tmp"])
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--commands is required"));
}

#[test]
fn test_convert_requires_input_argument() {
    let output = Command::new(bin_path())
        .arg("convert")
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--input is required"));
}

#[test]
fn test_invalid_analyzer_is_rejected() {
    let output = Command::new(bin_path())
        .args([
            "check",
            "--commands",
            "/tmp/none.json",
            "--workspace",
            "/tmp",
            "--analyzer",
            "pylint",
        ])
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid analyzer"));
}

#[test]
fn test_invalid_output_format_is_rejected() {
    let output = Command::new(bin_path())
        .args(["checkers", "--output", "yaml"])
        .output()
        .expect("Failed to run vetter");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid output format"));
}
