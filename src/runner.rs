//! Per-build-action task runner.
//!
//! Processes one action's sources strictly in order: skip check, fresh
//! result handler + invocation, success/failure branching, cleanup. The
//! runner is the failure boundary: whatever goes wrong inside one action
//! (error or panic) is reported and mapped to a generic failure result,
//! never propagated into the worker pool.

use crate::action::BuildAction;
use crate::analyzers::SourceAnalyzer;
use crate::cancel::{CancelToken, ProcessRegistry};
use crate::context::RunContext;
use crate::report::construct_result_handler;
use anyhow::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Outcome of one build action: return code, whether any source was
/// skipped, and the analyzer family that ran. Produced once, never
/// mutated, consumed only by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskResult {
    pub return_code: i32,
    pub skipped: bool,
    pub analyzer: crate::action::AnalyzerKind,
}

/// Execute one build action, absorbing all failures.
///
/// Analyzer exit codes are recorded in the result; unexpected errors and
/// panics inside the action are reported and become `(1, false, kind)`.
/// The cancel token is checked before every source, so a fired token stops
/// the action without spawning analyzers for the remaining sources.
pub fn run_action(
    action: &BuildAction,
    ctx: &RunContext,
    registry: &ProcessRegistry,
    cancel: &CancelToken,
) -> TaskResult {
    let outcome =
        catch_unwind(AssertUnwindSafe(|| run_action_inner(action, ctx, registry, cancel)));
    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            eprintln!("ERROR action failed unexpectedly: {:#}", e);
            TaskResult {
                return_code: 1,
                skipped: false,
                analyzer: action.analyzer,
            }
        }
        Err(_) => {
            eprintln!("ERROR action panicked; recorded as failed");
            TaskResult {
                return_code: 1,
                skipped: false,
                analyzer: action.analyzer,
            }
        }
    }
}

fn run_action_inner(
    action: &BuildAction,
    ctx: &RunContext,
    registry: &ProcessRegistry,
    cancel: &CancelToken,
) -> Result<TaskResult> {
    // If one source's analysis fails, the action's return code reflects
    // the last failure seen, but the remaining sources still run.
    let mut return_code = 0;
    let mut skipped = false;
    let config = ctx.config_for(action.analyzer)?;
    let env = ctx.check_env();

    for source in &action.sources {
        // A fired token means the run is being torn down; starting another
        // analyzer here would outlive the kill pass.
        if cancel.is_cancelled() {
            break;
        }

        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());

        if let Some(filter) = &ctx.skip_filter {
            if filter.should_skip(source) {
                println!("SKIP {}", source.display());
                skipped = true;
                continue;
            }
        }

        let mut handler =
            construct_result_handler(action.analyzer, source, &ctx.report_dir);
        let analyzer = SourceAnalyzer::new(action, config, source.clone());
        let cmd = analyzer.construct_cmd(handler.result_file());
        let output = analyzer.analyze(&cmd, &env, registry)?;

        if output.success() {
            handler.set_analyzer_result(cmd, output);
            handler.postprocess_result()?;
            handler.handle_results()?;
        } else {
            eprintln!(
                "ERROR analyzing {} failed (exit code {})",
                source_name, output.return_code
            );
            if !output.stdout.is_empty() {
                eprintln!("{}", output.stdout);
            }
            if !output.stderr.is_empty() {
                eprintln!("{}", output.stderr);
            }
            return_code = output.return_code;
        }

        if !ctx.keep_tmp {
            handler.clean_results();
        }
    }

    Ok(TaskResult {
        return_code,
        skipped,
        analyzer: action.analyzer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::AnalyzerKind;
    use crate::analyzers::config::AnalyzerConfig;
    use crate::skiplist::{GlobSkipFilter, SkipFilter};
    use std::collections::HashMap;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Write a fake analyzer script and return its path.
    fn fake_analyzer(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-tidy");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn context(dir: &TempDir, binary: &Path) -> RunContext {
        let mut configs = HashMap::new();
        configs.insert(AnalyzerKind::ClangTidy, AnalyzerConfig::new(binary));
        RunContext::new(configs, dir.path().to_path_buf())
    }

    fn action(sources: Vec<PathBuf>) -> BuildAction {
        BuildAction::new(
            sources,
            "c++",
            AnalyzerKind::ClangTidy,
            Vec::new(),
            std::env::temp_dir(),
        )
    }

    #[test]
    fn test_successful_action() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(dir.path(), "exit 0");
        let ctx = context(&dir, &binary);
        let registry = ProcessRegistry::new();

        let result = run_action(&action(vec![PathBuf::from("/a.cpp")]), &ctx, &registry, &CancelToken::new());
        assert_eq!(result.return_code, 0);
        assert!(!result.skipped);
        assert_eq!(result.analyzer, AnalyzerKind::ClangTidy);
    }

    #[test]
    fn test_zero_sources_yields_success_not_skipped() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(dir.path(), "exit 0");
        let ctx = context(&dir, &binary);
        let registry = ProcessRegistry::new();

        let result = run_action(&action(Vec::new()), &ctx, &registry, &CancelToken::new());
        assert_eq!(result.return_code, 0);
        assert!(!result.skipped);
    }

    #[test]
    fn test_all_sources_skipped() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(dir.path(), "echo should-not-run; exit 7");
        let mut ctx = context(&dir, &binary);
        ctx.skip_filter = Some(Box::new(GlobSkipFilter::parse("-*").unwrap()));
        let registry = ProcessRegistry::new();

        let result = run_action(
            &action(vec![PathBuf::from("/a.cpp"), PathBuf::from("/b.cpp")]),
            &ctx,
            &registry,
            &CancelToken::new(),
        );
        // No invocation happened: the failing script's exit code never
        // shows up.
        assert_eq!(result.return_code, 0);
        assert!(result.skipped);
    }

    #[test]
    fn test_skip_filter_rejects_one_source_of_many() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(dir.path(), "exit 0");
        let mut ctx = context(&dir, &binary);
        ctx.skip_filter = Some(Box::new(GlobSkipFilter::parse("-*/skipme.cpp").unwrap()));
        let registry = ProcessRegistry::new();

        let result = run_action(
            &action(vec![PathBuf::from("/p/skipme.cpp"), PathBuf::from("/p/keep.cpp")]),
            &ctx,
            &registry,
            &CancelToken::new(),
        );
        assert_eq!(result.return_code, 0);
        assert!(result.skipped);
    }

    #[test]
    fn test_failing_analyzer_records_exit_code_and_continues() {
        let dir = TempDir::new().unwrap();
        // Fail only for the first source; count invocations through marker
        // files to prove the second source still ran.
        let marker = dir.path().join("ran");
        let binary = fake_analyzer(
            dir.path(),
            &format!(
                "touch {}.$$\nif [ ! -f {} ]; then touch {}; exit 9; fi\nexit 0",
                marker.display(),
                marker.display(),
                marker.display()
            ),
        );
        let ctx = context(&dir, &binary);
        let registry = ProcessRegistry::new();

        let result = run_action(
            &action(vec![PathBuf::from("/a.cpp"), PathBuf::from("/b.cpp")]),
            &ctx,
            &registry,
            &CancelToken::new(),
        );
        assert_eq!(result.return_code, 9);
        assert!(!result.skipped);
        // Both sources were attempted.
        let attempts = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("ran."))
            .count();
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_fired_token_stops_remaining_sources() {
        let dir = TempDir::new().unwrap();
        let invoked = dir.path().join("invoked");
        let binary = fake_analyzer(
            dir.path(),
            &format!("touch {}.$$; exit 0", invoked.display()),
        );
        let ctx = context(&dir, &binary);
        let registry = ProcessRegistry::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = run_action(
            &action(vec![PathBuf::from("/a.cpp"), PathBuf::from("/b.cpp")]),
            &ctx,
            &registry,
            &cancel,
        );
        // No analyzer was spawned for either source.
        let invocations = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("invoked."))
            .count();
        assert_eq!(invocations, 0);
        assert_eq!(result.return_code, 0);
        assert!(!result.skipped);
    }

    #[test]
    fn test_missing_config_maps_to_generic_failure() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new(HashMap::new(), dir.path().to_path_buf());
        let registry = ProcessRegistry::new();

        let result = run_action(&action(vec![PathBuf::from("/a.cpp")]), &ctx, &registry, &CancelToken::new());
        assert_eq!(result.return_code, 1);
        assert!(!result.skipped);
    }

    #[test]
    fn test_missing_binary_maps_to_generic_failure() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, Path::new("/nonexistent/fake-tidy"));
        let registry = ProcessRegistry::new();

        let result = run_action(&action(vec![PathBuf::from("/a.cpp")]), &ctx, &registry, &CancelToken::new());
        assert_eq!(result.return_code, 1);
    }

    #[test]
    fn test_keep_tmp_preserves_report_artifacts() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(
            dir.path(),
            "echo \"/a.cpp:1:1: warning: w [misc-x]\"; echo code; echo '^'; exit 0",
        );
        let mut ctx = context(&dir, &binary);
        ctx.keep_tmp = true;
        let registry = ProcessRegistry::new();

        run_action(&action(vec![PathBuf::from("/a.cpp")]), &ctx, &registry, &CancelToken::new());
        let artifacts = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
            .count();
        assert_eq!(artifacts, 1);
    }

    #[test]
    fn test_clean_results_removes_report_artifacts_by_default() {
        let dir = TempDir::new().unwrap();
        let binary = fake_analyzer(
            dir.path(),
            "echo \"/a.cpp:1:1: warning: w [misc-x]\"; echo code; echo '^'; exit 0",
        );
        let ctx = context(&dir, &binary);
        let registry = ProcessRegistry::new();

        run_action(&action(vec![PathBuf::from("/a.cpp")]), &ctx, &registry, &CancelToken::new());
        let artifacts = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
            .count();
        assert_eq!(artifacts, 0);
    }

    // Compile-time check that the skip filter stays object safe.
    #[allow(dead_code)]
    fn assert_filter_object_safe(f: Box<dyn SkipFilter>) -> Box<dyn SkipFilter> {
        f
    }
}
