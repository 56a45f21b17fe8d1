//! Build actions and analyzer families.
//!
//! A [`BuildAction`] is the unit of work handed to the scheduler: one
//! compilation unit's worth of sources together with the analyzer family
//! that should process them. Actions are immutable once constructed; they
//! are built by whoever enumerates the compilation database and then only
//! read by the workers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The supported analyzer families.
///
/// The set of families is fixed and known at build time, so dispatch on
/// this enum replaces open subclassing everywhere an analyzer-specific
/// decision is needed (command construction, result handling).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerKind {
    /// clang-tidy: diagnostics arrive as free text on stdout and are
    /// converted into a structured document by the tidy parser.
    ClangTidy,
    /// Clang Static Analyzer: diagnostics are written by the analyzer
    /// itself as a plist file at the path the result handler chooses.
    ClangSa,
}

impl AnalyzerKind {
    /// Stable identifier used in summaries and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::ClangTidy => "clang-tidy",
            AnalyzerKind::ClangSa => "clangsa",
        }
    }

    /// Parse the identifier accepted by `--analyzer`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clang-tidy" | "tidy" => Some(AnalyzerKind::ClangTidy),
            "clangsa" | "clang-sa" | "sa" => Some(AnalyzerKind::ClangSa),
            _ => None,
        }
    }

    /// Default binary name for this family, used when no explicit
    /// binary path is configured.
    pub fn default_binary(&self) -> &'static str {
        match self {
            AnalyzerKind::ClangTidy => "clang-tidy",
            AnalyzerKind::ClangSa => "clang",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One compilation unit's worth of analysis work.
///
/// Sources within one action are analyzed strictly in order: later sources
/// in the same action may rely on analyzer context produced for earlier
/// ones, so the runner never reorders or parallelizes inside an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAction {
    /// Source files in textual (compilation database) order.
    pub sources: Vec<PathBuf>,
    /// Target language passed to the analyzer via `-x` (e.g. "c", "c++").
    pub lang: String,
    /// Analyzer family that processes this action.
    pub analyzer: AnalyzerKind,
    /// Extra options from the original compile command, forwarded to the
    /// analyzer after the `--` separator.
    pub analyzer_options: Vec<String>,
    /// Working directory for the analyzer invocation.
    pub directory: PathBuf,
}

impl BuildAction {
    pub fn new(
        sources: Vec<PathBuf>,
        lang: impl Into<String>,
        analyzer: AnalyzerKind,
        analyzer_options: Vec<String>,
        directory: PathBuf,
    ) -> Self {
        Self {
            sources,
            lang: lang.into(),
            analyzer,
            analyzer_options,
            directory,
        }
    }
}
