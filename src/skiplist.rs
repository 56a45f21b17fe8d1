//! Source skip filtering.
//!
//! The scheduler and task runner only ever call [`SkipFilter::should_skip`];
//! where the rules come from is a caller concern. The bundled
//! [`GlobSkipFilter`] reads the conventional skip-file format: one glob per
//! line, prefixed with `-` (skip matching paths) or `+` (keep matching
//! paths), first matching rule wins.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobMatcher};
use std::path::Path;

/// Predicate deciding whether a source path is excluded from analysis.
pub trait SkipFilter: Send + Sync {
    fn should_skip(&self, path: &Path) -> bool;
}

#[derive(Debug)]
struct SkipRule {
    matcher: GlobMatcher,
    skip: bool,
}

/// Glob-based skip filter with first-match-wins semantics.
///
/// Paths that match no rule are kept.
#[derive(Debug, Default)]
pub struct GlobSkipFilter {
    rules: Vec<SkipRule>,
}

impl GlobSkipFilter {
    /// Parse skip rules from the contents of a skip file.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (skip, pattern) = match line.split_at(1) {
                ("-", rest) => (true, rest.trim()),
                ("+", rest) => (false, rest.trim()),
                _ => bail!(
                    "skip rule on line {} must start with '-' or '+': {}",
                    lineno + 1,
                    line
                ),
            };
            let matcher = Glob::new(pattern)
                .with_context(|| format!("invalid skip glob on line {}: {}", lineno + 1, pattern))?
                .compile_matcher();
            rules.push(SkipRule { matcher, skip });
        }
        Ok(Self { rules })
    }

    /// Load skip rules from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read skip file: {}", path.display()))?;
        Self::parse(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl SkipFilter for GlobSkipFilter {
    fn should_skip(&self, path: &Path) -> bool {
        for rule in &self.rules {
            if rule.matcher.is_match(path) {
                return rule.skip;
            }
        }
        false
    }
}
