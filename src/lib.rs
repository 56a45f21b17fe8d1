//! vetter: a parallel static-analysis driver for C and C++ projects
//!
//! vetter loads a compilation database, fans the entries out to a pool of
//! worker threads, invokes clang-tidy or the Clang Static Analyzer on each
//! source, and converts clang-tidy's free-text output into structured
//! diagnostic documents.
//!
//! # Pipeline
//!
//! 1. [`compilation`] reads `compile_commands.json` into [`action::BuildAction`]s.
//! 2. [`scheduler`] drains the actions on a worker pool, responsive to a
//!    [`cancel::CancelToken`].
//! 3. [`runner`] processes one action: skip filtering, invocation via
//!    [`analyzers`], result handling via [`report`].
//! 4. [`tidy`] parses clang-tidy output and builds diagnostic documents.
//!
//! # Position Conventions
//!
//! Diagnostic locations use clang's conventions: 1-indexed lines and
//! 1-indexed columns, exactly as they appear in the analyzer's output.

pub mod action;
pub mod analyzers;
pub mod cancel;
pub mod compilation;
pub mod context;
pub mod output;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod skiplist;
pub mod tidy;
pub mod version;

pub use action::{AnalyzerKind, BuildAction};
pub use cancel::{CancelToken, ProcessRegistry};
pub use compilation::load_build_actions;
pub use context::RunContext;
pub use output::{
    generate_execution_id, output_json, CheckResponse, CheckersResponse, ConvertResponse,
    JsonResponse, OutputFormat,
};
pub use runner::TaskResult;
pub use scheduler::{run_actions, ReportDir, RunError, RunSummary};
pub use skiplist::{GlobSkipFilter, SkipFilter};
pub use tidy::{DiagnosticDocument, DocumentBuilder, Message, Note, OutputParser};
