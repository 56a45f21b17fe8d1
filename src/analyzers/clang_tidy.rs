//! clang-tidy command construction and checker discovery.

use crate::action::BuildAction;
use crate::analyzers::config::AnalyzerConfig;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Assemble the `-checks=` argument from the ordered checker table.
///
/// Starts from `-*` (everything off), then appends `,name` or `,-name`
/// per registered checker in table order. Returns `None` when no checkers
/// are registered so the tool's own default profile stays in effect.
pub fn checks_argument(config: &AnalyzerConfig) -> Option<String> {
    if config.checkers().is_empty() {
        return None;
    }
    let mut cmdline = String::from("-*");
    for (name, state) in config.checkers() {
        cmdline.push(',');
        if !state.enabled {
            cmdline.push('-');
        }
        cmdline.push_str(name);
    }
    Some(format!("-checks={}", cmdline))
}

/// Build the full clang-tidy command line for one source file.
pub fn construct_cmd(source: &Path, action: &BuildAction, config: &AnalyzerConfig) -> Vec<String> {
    let mut cmd = vec![config.binary().to_string_lossy().into_owned()];

    if let Some(checks) = checks_argument(config) {
        cmd.push(checks);
    }
    cmd.extend(config.analyzer_extra_arguments.iter().cloned());
    cmd.push(source.to_string_lossy().into_owned());

    // Everything after the separator goes to the compiler front end.
    cmd.push("--".to_string());
    cmd.extend(config.compiler_arguments(&action.lang));
    cmd.extend(action.analyzer_options.iter().cloned());
    cmd
}

/// Ask the installed clang-tidy for its supported checkers.
///
/// Returns `(name, description)` pairs in the order the tool lists them.
pub fn list_checkers(
    binary: &Path,
    env: &[(String, String)],
) -> Result<Vec<(String, String)>> {
    let mut command = Command::new(binary);
    command.args(["-list-checks", "-checks=*", "-", "--"]);
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command
        .output()
        .with_context(|| format!("cannot run {} -list-checks", binary.display()))?;
    if !output.status.success() {
        anyhow::bail!(
            "{} -list-checks failed with exit code {:?}",
            binary.display(),
            output.status.code()
        );
    }
    Ok(parse_checker_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `-list-checks` output.
///
/// Skips the `Enabled checks:` header, blank lines, and the checkers the
/// Clang Static Analyzer family owns (`clang-analyzer-*`).
pub fn parse_checker_list(output: &str) -> Vec<(String, String)> {
    let mut checkers = Vec::new();
    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("Enabled checks:") {
            continue;
        }
        if line.starts_with("clang-analyzer-") {
            continue;
        }
        if line.split_whitespace().count() == 1 {
            checkers.push((line.to_string(), String::new()));
        }
    }
    checkers
}
