//! Checkers command implementation

use anyhow::Result;
use std::path::PathBuf;
use vetter::analyzers::clang_tidy;
use vetter::output::{generate_execution_id, output_json, CheckersResponse, JsonResponse};
use vetter::{AnalyzerKind, OutputFormat};

pub fn run_checkers(binary: Option<PathBuf>, output_format: OutputFormat) -> Result<()> {
    let binary = binary.unwrap_or_else(|| {
        let name = AnalyzerKind::ClangTidy.default_binary();
        which::which(name).unwrap_or_else(|_| PathBuf::from(name))
    });

    let checkers = clang_tidy::list_checkers(&binary, &[])?;

    match output_format {
        OutputFormat::Human => {
            for (name, description) in &checkers {
                if description.is_empty() {
                    println!("{}", name);
                } else {
                    println!("{}  {}", name, description);
                }
            }
        }
        OutputFormat::Json => {
            let response = JsonResponse::new(
                "checkers",
                CheckersResponse {
                    binary: binary.display().to_string(),
                    checkers: checkers.into_iter().map(|(name, _)| name).collect(),
                },
                &generate_execution_id(),
            );
            output_json(&response)?;
        }
    }

    Ok(())
}
