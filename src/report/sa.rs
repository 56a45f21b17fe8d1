//! Result handler for the Clang Static Analyzer family.
//!
//! The analyzer writes its plist report itself (the invocation's `-o`
//! points at [`ResultHandler::result_file`]); this handler only verifies
//! and reports the artifact.

use crate::action::AnalyzerKind;
use crate::analyzers::ProcessOutput;
use crate::report::{artifact_name, ResultHandler};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct SaResultHandler {
    analyzed_file: PathBuf,
    result_file: PathBuf,
    analyzer_cmd: Vec<String>,
    output: Option<ProcessOutput>,
}

impl SaResultHandler {
    pub fn new(source: &Path, report_dir: &Path) -> Self {
        let result_file = report_dir.join(artifact_name(source, AnalyzerKind::ClangSa, "plist"));
        Self {
            analyzed_file: source.to_path_buf(),
            result_file,
            analyzer_cmd: Vec::new(),
            output: None,
        }
    }
}

impl ResultHandler for SaResultHandler {
    fn result_file(&self) -> &Path {
        &self.result_file
    }

    fn set_analyzer_result(&mut self, cmd: Vec<String>, output: ProcessOutput) {
        self.analyzer_cmd = cmd;
        self.output = Some(output);
    }

    fn postprocess_result(&mut self) -> Result<()> {
        // The plist is produced by the analyzer; a successful run with no
        // findings may legitimately leave no file behind.
        if !self.result_file.exists() {
            eprintln!(
                "WARN {}: analyzer produced no plist report",
                self.analyzed_file.display()
            );
        }
        Ok(())
    }

    fn handle_results(&mut self) -> Result<()> {
        if let Ok(metadata) = std::fs::metadata(&self.result_file) {
            println!(
                "PLIST {} ({} bytes)",
                self.result_file.display(),
                metadata.len()
            );
        }
        Ok(())
    }

    fn clean_results(&mut self) {
        let _ = std::fs::remove_file(&self.result_file);
    }
}
