//! Result handler for the clang-tidy family.
//!
//! Converts the analyzer's free-text stdout into a [`DiagnosticDocument`]
//! and writes it as JSON into the run's report directory.

use crate::action::AnalyzerKind;
use crate::analyzers::ProcessOutput;
use crate::report::{artifact_name, ResultHandler};
use crate::tidy::{DiagnosticDocument, DocumentBuilder, OutputParser};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct TidyResultHandler {
    analyzed_file: PathBuf,
    result_file: PathBuf,
    analyzer_cmd: Vec<String>,
    output: Option<ProcessOutput>,
    document: Option<DiagnosticDocument>,
}

impl TidyResultHandler {
    pub fn new(source: &Path, report_dir: &Path) -> Self {
        let result_file =
            report_dir.join(artifact_name(source, AnalyzerKind::ClangTidy, "json"));
        Self {
            analyzed_file: source.to_path_buf(),
            result_file,
            analyzer_cmd: Vec::new(),
            output: None,
            document: None,
        }
    }

    /// The converted document, available after post-processing.
    pub fn document(&self) -> Option<&DiagnosticDocument> {
        self.document.as_ref()
    }
}

impl ResultHandler for TidyResultHandler {
    fn result_file(&self) -> &Path {
        &self.result_file
    }

    fn set_analyzer_result(&mut self, cmd: Vec<String>, output: ProcessOutput) {
        self.analyzer_cmd = cmd;
        self.output = Some(output);
    }

    fn postprocess_result(&mut self) -> Result<()> {
        let stdout = self
            .output
            .as_ref()
            .map(|o| o.stdout.as_str())
            .unwrap_or_default();

        let mut parser = OutputParser::new();
        parser.parse_string(stdout);
        for anomaly in parser.anomalies() {
            eprintln!(
                "WARN {}: unexpected analyzer output line ({})",
                self.analyzed_file.display(),
                anomaly
            );
        }

        let mut builder = DocumentBuilder::new();
        builder.add_messages(parser.messages());
        let document = builder.finish();
        document.write_to_file(&self.result_file)?;
        self.document = Some(document);
        Ok(())
    }

    fn handle_results(&mut self) -> Result<()> {
        let Some(document) = &self.document else {
            return Ok(());
        };
        for diagnostic in &document.diagnostics {
            let file = document
                .files
                .get(diagnostic.location.file)
                .map(String::as_str)
                .unwrap_or("<unknown>");
            println!(
                "REPORT {}:{}:{} [{}] {}",
                file,
                diagnostic.location.line,
                diagnostic.location.col,
                diagnostic.check_name,
                diagnostic.description
            );
        }
        Ok(())
    }

    fn clean_results(&mut self) {
        let _ = std::fs::remove_file(&self.result_file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIDY_OUTPUT: &str = "\
/a.cpp:10:5: warning: unused variable 'x' [misc-unused]
  int x = 0;
      ^
";

    fn handler_with_output(dir: &TempDir, stdout: &str) -> TidyResultHandler {
        let mut handler = TidyResultHandler::new(Path::new("/a.cpp"), dir.path());
        handler.set_analyzer_result(
            vec!["clang-tidy".to_string()],
            ProcessOutput {
                return_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        handler
    }

    #[test]
    fn test_postprocess_writes_document() {
        let dir = TempDir::new().unwrap();
        let mut handler = handler_with_output(&dir, TIDY_OUTPUT);
        handler.postprocess_result().unwrap();

        assert!(handler.result_file().exists());
        let document = handler.document().unwrap();
        assert_eq!(document.files, vec!["/a.cpp"]);
        assert_eq!(document.diagnostics.len(), 1);
        assert_eq!(document.diagnostics[0].check_name, "misc-unused");

        // The written file round-trips to the same document.
        let text = std::fs::read_to_string(handler.result_file()).unwrap();
        let reread: DiagnosticDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(&reread, document);
    }

    #[test]
    fn test_postprocess_empty_output_yields_empty_document() {
        let dir = TempDir::new().unwrap();
        let mut handler = handler_with_output(&dir, "");
        handler.postprocess_result().unwrap();
        let document = handler.document().unwrap();
        assert!(document.files.is_empty());
        assert!(document.diagnostics.is_empty());
    }

    #[test]
    fn test_clean_results_removes_artifact_and_never_fails() {
        let dir = TempDir::new().unwrap();
        let mut handler = handler_with_output(&dir, TIDY_OUTPUT);
        handler.postprocess_result().unwrap();
        assert!(handler.result_file().exists());
        handler.clean_results();
        assert!(!handler.result_file().exists());
        // Second cleanup is a no-op, not an error.
        handler.clean_results();
    }
}
