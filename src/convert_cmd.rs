//! Convert command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use vetter::output::{generate_execution_id, output_json, ConvertResponse, JsonResponse};
use vetter::{DocumentBuilder, OutputFormat, OutputParser};

pub fn run_convert(
    input: PathBuf,
    report: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let mut parser = OutputParser::new();
    parser
        .parse_messages_from_file(&input)
        .with_context(|| format!("cannot parse {}", input.display()))?;
    for anomaly in parser.anomalies() {
        eprintln!(
            "WARN {}: unexpected analyzer output line ({})",
            input.display(),
            anomaly
        );
    }

    let mut builder = DocumentBuilder::new();
    builder.add_messages(parser.messages());
    let document = builder.finish();

    if let Some(report) = &report {
        document
            .write_to_file(report)
            .with_context(|| format!("cannot write report {}", report.display()))?;
    }

    match output_format {
        OutputFormat::Human => {
            if report.is_none() {
                println!("{}", document.to_json_pretty()?);
            } else {
                println!(
                    "CONVERT {}: {} diagnostics across {} files",
                    input.display(),
                    document.diagnostics.len(),
                    document.files.len()
                );
            }
        }
        OutputFormat::Json => {
            let response = JsonResponse::new(
                "convert",
                ConvertResponse {
                    input: input.display().to_string(),
                    diagnostics: document.diagnostics.len(),
                    files: document.files.len(),
                    report_file: report.as_ref().map(|p| p.display().to_string()),
                },
                &generate_execution_id(),
            );
            output_json(&response)?;
        }
    }

    Ok(())
}
