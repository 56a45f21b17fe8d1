//! Shared immutable run context.
//!
//! Built once during setup and shared read-only across all workers for the
//! whole run; nothing in here is mutated after dispatch begins, so no
//! locking is needed.

use crate::action::AnalyzerKind;
use crate::analyzers::config::AnalyzerConfig;
use crate::skiplist::SkipFilter;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything a worker needs besides the action itself.
pub struct RunContext {
    /// Per-family analyzer configuration.
    pub configs: HashMap<AnalyzerKind, AnalyzerConfig>,
    /// Optional source exclusion predicate; `None` means nothing is skipped.
    pub skip_filter: Option<Box<dyn SkipFilter>>,
    /// Per-run report directory all workers write under.
    pub report_dir: PathBuf,
    /// Preserve per-invocation artifacts instead of cleaning them.
    pub keep_tmp: bool,
    /// Extra entries prepended to the child's PATH.
    pub path_env_extra: Vec<String>,
    /// Extra entries prepended to the child's LD_LIBRARY_PATH.
    pub ld_lib_path_extra: Vec<String>,
}

impl RunContext {
    pub fn new(configs: HashMap<AnalyzerKind, AnalyzerConfig>, report_dir: PathBuf) -> Self {
        Self {
            configs,
            skip_filter: None,
            report_dir,
            keep_tmp: false,
            path_env_extra: Vec::new(),
            ld_lib_path_extra: Vec::new(),
        }
    }

    pub fn config_for(&self, kind: AnalyzerKind) -> Result<&AnalyzerConfig> {
        self.configs
            .get(&kind)
            .ok_or_else(|| anyhow!("no analyzer configuration for {}", kind))
    }

    /// Derive the child-process environment: extra PATH and
    /// LD_LIBRARY_PATH entries are prepended to the inherited values.
    pub fn check_env(&self) -> Vec<(String, String)> {
        let mut env = Vec::new();
        if !self.path_env_extra.is_empty() {
            env.push((
                "PATH".to_string(),
                prepend_paths(&self.path_env_extra, std::env::var("PATH").ok()),
            ));
        }
        if !self.ld_lib_path_extra.is_empty() {
            env.push((
                "LD_LIBRARY_PATH".to_string(),
                prepend_paths(
                    &self.ld_lib_path_extra,
                    std::env::var("LD_LIBRARY_PATH").ok(),
                ),
            ));
        }
        env
    }
}

fn prepend_paths(extra: &[String], existing: Option<String>) -> String {
    let mut joined = extra.join(":");
    if let Some(existing) = existing.filter(|e| !e.is_empty()) {
        joined.push(':');
        joined.push_str(&existing);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_for_missing_kind_is_error() {
        let ctx = RunContext::new(HashMap::new(), PathBuf::from("/tmp/reports"));
        assert!(ctx.config_for(AnalyzerKind::ClangTidy).is_err());
    }

    #[test]
    fn test_check_env_empty_without_extras() {
        let ctx = RunContext::new(HashMap::new(), PathBuf::from("/tmp/reports"));
        assert!(ctx.check_env().is_empty());
    }

    #[test]
    fn test_prepend_paths_keeps_existing_tail() {
        let joined = prepend_paths(
            &["/opt/clang/bin".to_string()],
            Some("/usr/bin".to_string()),
        );
        assert_eq!(joined, "/opt/clang/bin:/usr/bin");
    }

    #[test]
    fn test_prepend_paths_without_existing() {
        let joined = prepend_paths(&["/a".to_string(), "/b".to_string()], None);
        assert_eq!(joined, "/a:/b");
    }
}
