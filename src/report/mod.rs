//! Result handlers: per-analyzer-family post-processing of raw output.
//!
//! A fresh handler is constructed for every (action, source) pair that is
//! actually analyzed. The contract is fixed: the runner stores the raw
//! invocation output on the handler, then calls `postprocess_result`
//! (transform raw output into a reportable document), `handle_results`
//! (emit it), and finally `clean_results` (best-effort artifact cleanup,
//! never fails the run).

pub mod sa;
pub mod tidy;

use crate::action::AnalyzerKind;
use crate::analyzers::ProcessOutput;
use anyhow::Result;
use std::path::Path;

/// Per-invocation result sink.
pub trait ResultHandler {
    /// Where this handler's report artifact lives inside the run's report
    /// directory. Plist-emitting analyzers write here directly; text-output
    /// analyzers write here during post-processing.
    fn result_file(&self) -> &Path;

    /// Store the invocation's command line and captured output.
    fn set_analyzer_result(&mut self, cmd: Vec<String>, output: ProcessOutput);

    /// Transform raw output into the persisted/reportable form.
    fn postprocess_result(&mut self) -> Result<()>;

    /// Emit the results (line protocol on stdout).
    fn handle_results(&mut self) -> Result<()>;

    /// Remove per-invocation artifacts. Best effort: must not fail.
    fn clean_results(&mut self);
}

/// Construct the result handler matching the analyzer family.
///
/// The family set is closed; this is the single dispatch point.
pub fn construct_result_handler(
    kind: AnalyzerKind,
    source: &Path,
    report_dir: &Path,
) -> Box<dyn ResultHandler> {
    match kind {
        AnalyzerKind::ClangTidy => Box::new(tidy::TidyResultHandler::new(source, report_dir)),
        AnalyzerKind::ClangSa => Box::new(sa::SaResultHandler::new(source, report_dir)),
    }
}

/// Report artifact file name: `<source stem>_<kind>_<uuid>.<ext>`, unique
/// per invocation so concurrent actions never collide.
pub(crate) fn artifact_name(source: &Path, kind: AnalyzerKind, ext: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string());
    format!("{}_{}_{}.{}", stem, kind.as_str(), uuid::Uuid::new_v4(), ext)
}
