//! JSON output types for CLI commands
//!
//! Provides schema-versioned response types so machine consumers can parse
//! command output without scraping the human line protocol.

use serde::{Deserialize, Serialize};

/// Current JSON output schema version
pub const VETTER_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
///
/// Every JSON response includes schema_version and execution_id for
/// parsing stability and traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    /// Command that produced the response
    pub command: String,
    /// Response data
    pub data: T,
}

impl<T> JsonResponse<T> {
    pub fn new(command: &str, data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: VETTER_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            command: command.to_string(),
            data,
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Human,
    /// JSON output with schema versioning
    Json,
}

impl OutputFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Generate a unique execution ID for this run
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// `check` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub report_dir: Option<String>,
}

/// `convert` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub input: String,
    pub diagnostics: usize,
    pub files: usize,
    pub report_file: Option<String>,
}

/// `checkers` response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckersResponse {
    pub binary: String,
    pub checkers: Vec<String>,
}
