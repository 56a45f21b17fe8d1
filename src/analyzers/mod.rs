//! Analyzer invocation layer.
//!
//! One [`SourceAnalyzer`] binds a build action, its family config, and a
//! single source file; `analyze` builds the family-specific command line
//! and runs it as a child process, capturing exit code, stdout, and
//! stderr. The core never interprets the binary's semantics beyond
//! exit-code-zero-means-success.

pub mod clang_sa;
pub mod clang_tidy;
pub mod config;

use crate::action::{AnalyzerKind, BuildAction};
use crate::cancel::ProcessRegistry;
use anyhow::{Context, Result};
use config::AnalyzerConfig;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Captured output of one analyzer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Child exit code; -1 when the process was terminated by a signal.
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Poll interval while waiting on a registered child process.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Run a command to completion, capturing its output.
///
/// The child is registered in `registry` for its whole lifetime so the
/// cancel path can terminate it; stdout and stderr go through unnamed
/// temporary files rather than pipes, so a chatty analyzer can never
/// deadlock the polling loop.
pub fn run_proc(
    cmd: &[String],
    env: &[(String, String)],
    cwd: Option<&Path>,
    registry: &ProcessRegistry,
) -> Result<ProcessOutput> {
    let (program, args) = cmd.split_first().context("empty analyzer command")?;

    let mut stdout_file = tempfile::tempfile().context("cannot create stdout capture file")?;
    let mut stderr_file = tempfile::tempfile().context("cannot create stderr capture file")?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout_file.try_clone().context("cannot clone stdout capture")?)
        .stderr(stderr_file.try_clone().context("cannot clone stderr capture")?);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    for (key, value) in env {
        command.env(key, value);
    }

    let child = command
        .spawn()
        .with_context(|| format!("cannot start analyzer: {}", program))?;
    let id = registry.register(child)?;

    let status = loop {
        match registry.try_wait(id)? {
            Some(status) => break status,
            None => std::thread::sleep(WAIT_POLL),
        }
    };
    registry.remove(id);

    let mut stdout = String::new();
    stdout_file.seek(SeekFrom::Start(0))?;
    stdout_file.read_to_string(&mut stdout)?;
    let mut stderr = String::new();
    stderr_file.seek(SeekFrom::Start(0))?;
    stderr_file.read_to_string(&mut stderr)?;

    Ok(ProcessOutput {
        return_code: status.and_then(|s| s.code()).unwrap_or(-1),
        stdout,
        stderr,
    })
}

/// One analyzer invocation bound to a single source file.
///
/// Command construction dispatches on the action's [`AnalyzerKind`]; the
/// set of families is closed, so no trait object is needed here.
pub struct SourceAnalyzer<'a> {
    pub action: &'a BuildAction,
    pub config: &'a AnalyzerConfig,
    pub source: PathBuf,
}

impl<'a> SourceAnalyzer<'a> {
    pub fn new(action: &'a BuildAction, config: &'a AnalyzerConfig, source: PathBuf) -> Self {
        Self {
            action,
            config,
            source,
        }
    }

    /// Build the command line for this invocation. `result_file` is where
    /// plist-emitting families write their report; text-output families
    /// ignore it.
    pub fn construct_cmd(&self, result_file: &Path) -> Vec<String> {
        match self.action.analyzer {
            AnalyzerKind::ClangTidy => {
                clang_tidy::construct_cmd(&self.source, self.action, self.config)
            }
            AnalyzerKind::ClangSa => {
                clang_sa::construct_cmd(&self.source, self.action, self.config, result_file)
            }
        }
    }

    /// Run the invocation synchronously with the given environment.
    pub fn analyze(
        &self,
        cmd: &[String],
        env: &[(String, String)],
        registry: &ProcessRegistry,
    ) -> Result<ProcessOutput> {
        run_proc(cmd, env, Some(&self.action.directory), registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_proc_captures_stdout_and_exit_code() {
        let registry = ProcessRegistry::new();
        let cmd = vec!["echo".to_string(), "hello".to_string()];
        let output = run_proc(&cmd, &[], None, &registry).unwrap();
        assert_eq!(output.return_code, 0);
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert!(output.stderr.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_run_proc_reports_nonzero_exit() {
        let registry = ProcessRegistry::new();
        let cmd = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo oops >&2; exit 3".to_string(),
        ];
        let output = run_proc(&cmd, &[], None, &registry).unwrap();
        assert_eq!(output.return_code, 3);
        assert!(!output.success());
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[test]
    fn test_run_proc_passes_environment() {
        let registry = ProcessRegistry::new();
        let cmd = vec!["sh".to_string(), "-c".to_string(), "echo $VETTER_TEST_VAR".to_string()];
        let env = vec![("VETTER_TEST_VAR".to_string(), "marker".to_string())];
        let output = run_proc(&cmd, &env, None, &registry).unwrap();
        assert_eq!(output.stdout.trim(), "marker");
    }

    #[test]
    fn test_run_proc_missing_binary_is_error() {
        let registry = ProcessRegistry::new();
        let cmd = vec!["definitely-not-a-real-binary-name".to_string()];
        assert!(run_proc(&cmd, &[], None, &registry).is_err());
    }

    #[test]
    fn test_empty_command_is_error() {
        let registry = ProcessRegistry::new();
        assert!(run_proc(&[], &[], None, &registry).is_err());
    }
}
