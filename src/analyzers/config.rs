//! Per-analyzer-family configuration.
//!
//! An [`AnalyzerConfig`] is mutated only while the run is being set up;
//! during task execution it is shared read-only across all workers (the
//! scheduler wraps the config map in an `Arc`), so no locking is needed.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Enablement state and description of one checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerState {
    pub enabled: bool,
    pub description: String,
}

/// Settings for one analyzer family.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Path to the analyzer binary.
    pub analyzer_binary: PathBuf,
    /// Directory holding checker plugins (shared objects), if any.
    pub analyzer_plugins_dir: Option<PathBuf>,
    /// Compiler sysroot forwarded with `--sysroot`.
    pub compiler_sysroot: Option<String>,
    /// Compiler resource directories (`-resource-dir` + `-isystem`).
    pub compiler_resource_dirs: Vec<String>,
    /// System include paths (`-isystem`).
    pub system_includes: Vec<String>,
    /// User include paths (`-I`).
    pub includes: Vec<String>,
    /// Raw arguments forwarded to the analyzer without modification.
    pub analyzer_extra_arguments: Vec<String>,
    // Checker name to state, preserving insertion order. The order drives
    // the -checks= argument and must stay stable across runs.
    checkers: Vec<(String, CheckerState)>,
}

impl AnalyzerConfig {
    pub fn new(analyzer_binary: impl Into<PathBuf>) -> Self {
        Self {
            analyzer_binary: analyzer_binary.into(),
            ..Self::default()
        }
    }

    /// Register a checker. Re-adding an existing checker updates its state
    /// in place without changing its position.
    pub fn add_checker(
        &mut self,
        name: impl Into<String>,
        enabled: bool,
        description: impl Into<String>,
    ) {
        let name = name.into();
        let state = CheckerState {
            enabled,
            description: description.into(),
        };
        match self.checkers.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = state,
            None => self.checkers.push((name, state)),
        }
    }

    /// Enable every registered checker whose name starts with `prefix`,
    /// keeping descriptions intact.
    pub fn enable_checker(&mut self, prefix: &str) {
        for (name, state) in &mut self.checkers {
            if name.starts_with(prefix) {
                state.enabled = true;
            }
        }
    }

    /// Disable every registered checker whose name starts with `prefix`.
    pub fn disable_checker(&mut self, prefix: &str) {
        for (name, state) in &mut self.checkers {
            if name.starts_with(prefix) {
                state.enabled = false;
            }
        }
    }

    /// Whether any registered checker name starts with `prefix`.
    pub fn has_checker(&self, prefix: &str) -> bool {
        self.checkers.iter().any(|(name, _)| name.starts_with(prefix))
    }

    /// The ordered checker table.
    pub fn checkers(&self) -> &[(String, CheckerState)] {
        &self.checkers
    }

    /// Full paths of the analyzer plugins found in the plugins directory.
    pub fn analyzer_plugins(&self) -> Result<Vec<PathBuf>> {
        let Some(dir) = &self.analyzer_plugins_dir else {
            return Ok(Vec::new());
        };
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("cannot read plugins directory: {}", dir.display()))?;
        let mut plugins = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                plugins.push(path);
            }
        }
        plugins.sort();
        Ok(plugins)
    }

    /// Compiler-side arguments shared by all analyzer families: resource
    /// dirs, sysroot, system and user includes, and the target language.
    pub fn compiler_arguments(&self, lang: &str) -> Vec<String> {
        let mut args = Vec::new();
        for dir in &self.compiler_resource_dirs {
            args.push("-resource-dir".to_string());
            args.push(dir.clone());
            args.push("-isystem".to_string());
            args.push(dir.clone());
        }
        if let Some(sysroot) = &self.compiler_sysroot {
            args.push("--sysroot".to_string());
            args.push(sysroot.clone());
        }
        for path in &self.system_includes {
            args.push("-isystem".to_string());
            args.push(path.clone());
        }
        for path in &self.includes {
            args.push("-I".to_string());
            args.push(path.clone());
        }
        args.push("-x".to_string());
        args.push(lang.to_string());
        args
    }

    pub fn binary(&self) -> &Path {
        &self.analyzer_binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_checker_preserves_order() {
        let mut config = AnalyzerConfig::new("clang-tidy");
        config.add_checker("misc-unused", false, "finds unused things");
        config.add_checker("bugprone-branch-clone", false, "");
        config.add_checker("misc-sizeof", true, "");
        let names: Vec<&str> = config.checkers().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["misc-unused", "bugprone-branch-clone", "misc-sizeof"]);
    }

    #[test]
    fn test_re_adding_updates_in_place() {
        let mut config = AnalyzerConfig::new("clang-tidy");
        config.add_checker("misc-unused", false, "old");
        config.add_checker("bugprone-x", false, "");
        config.add_checker("misc-unused", true, "new");
        assert_eq!(config.checkers().len(), 2);
        assert_eq!(config.checkers()[0].0, "misc-unused");
        assert!(config.checkers()[0].1.enabled);
        assert_eq!(config.checkers()[0].1.description, "new");
    }

    #[test]
    fn test_enable_checker_matches_prefix() {
        let mut config = AnalyzerConfig::new("clang-tidy");
        config.add_checker("misc-unused", false, "keep me");
        config.add_checker("misc-sizeof", false, "");
        config.add_checker("bugprone-x", false, "");
        config.enable_checker("misc");
        assert!(config.checkers()[0].1.enabled);
        assert!(config.checkers()[1].1.enabled);
        assert!(!config.checkers()[2].1.enabled);
        // Descriptions survive the flip.
        assert_eq!(config.checkers()[0].1.description, "keep me");
    }

    #[test]
    fn test_disable_checker_matches_prefix() {
        let mut config = AnalyzerConfig::new("clang-tidy");
        config.add_checker("misc-unused", true, "");
        config.add_checker("bugprone-x", true, "");
        config.disable_checker("bugprone");
        assert!(config.checkers()[0].1.enabled);
        assert!(!config.checkers()[1].1.enabled);
    }

    #[test]
    fn test_compiler_arguments_shape() {
        let mut config = AnalyzerConfig::new("clang-tidy");
        config.compiler_resource_dirs = vec!["/res".to_string()];
        config.compiler_sysroot = Some("/sysroot".to_string());
        config.system_includes = vec!["/usr/include".to_string()];
        config.includes = vec!["/proj/include".to_string()];
        let args = config.compiler_arguments("c++");
        assert_eq!(
            args,
            vec![
                "-resource-dir", "/res", "-isystem", "/res",
                "--sysroot", "/sysroot",
                "-isystem", "/usr/include",
                "-I", "/proj/include",
                "-x", "c++",
            ]
        );
    }
}
