//! Diagnostic document model and builder.
//!
//! A [`DiagnosticDocument`] is the exportable form of a batch of parsed
//! messages: a deduplicated, insertion-ordered file table plus one
//! diagnostic record per message. Every location anywhere in the document
//! refers into the file table by index; the table and the indices are
//! built together, so an index can never dangle. Output is deterministic:
//! the same message list always serializes to the same bytes.

use crate::tidy::{Message, Note};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Report type tag carried by every diagnostic record.
pub const REPORT_TYPE_CLANG_TIDY: &str = "clang-tidy";

/// A file-indexed source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub col: u32,
    /// Index into [`DiagnosticDocument::files`].
    pub file: usize,
}

/// A control edge connecting two consecutive notes of one diagnostic.
///
/// Start and end are doubled ranges (point ranges) as downstream
/// visualizers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub start: [Location; 2],
    pub end: [Location; 2],
}

/// One entry of a diagnostic's causal-chain path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathPiece {
    Event {
        location: Location,
        depth: u32,
        message: String,
    },
    Control {
        edges: Vec<Edge>,
    },
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub location: Location,
    pub check_name: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub path: Vec<PathPiece>,
}

/// The exportable diagnostic document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticDocument {
    /// Unique file paths, first-seen order.
    pub files: Vec<String>,
    /// One record per parsed message, input order.
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticDocument {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("cannot serialize diagnostic document")
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create report file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("cannot write report file: {}", path.display()))
    }
}

/// The category is the checker name's first hyphen-delimited segment
/// (e.g. `misc-unused` -> `misc`).
pub fn checker_category(checker: &str) -> String {
    match checker.split('-').next() {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Accumulates parsed messages into a [`DiagnosticDocument`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    files: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    index: HashMap<String, usize>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of messages to the document.
    ///
    /// File paths are interned in the same order the original converter
    /// used: per message, first the message's own path, then its notes'
    /// paths, across messages in input order.
    pub fn add_messages(&mut self, messages: &[Message]) {
        for message in messages {
            self.intern(&message.path);
            for note in &message.notes {
                self.intern(&note.path);
            }
        }
        for message in messages {
            let diagnostic = self.create_diagnostic(message);
            self.diagnostics.push(diagnostic);
        }
    }

    /// Finish building, yielding the document.
    pub fn finish(self) -> DiagnosticDocument {
        DiagnosticDocument {
            files: self.files,
            diagnostics: self.diagnostics,
        }
    }

    fn intern(&mut self, path: &str) -> usize {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let idx = self.files.len();
        self.files.push(path.to_string());
        self.index.insert(path.to_string(), idx);
        idx
    }

    fn location(&mut self, note: &Note) -> Location {
        Location {
            line: note.line,
            col: note.column,
            file: self.intern(&note.path),
        }
    }

    fn event(&mut self, note: &Note, message: String) -> PathPiece {
        PathPiece::Event {
            location: self.location(note),
            depth: 0,
            message,
        }
    }

    fn create_diagnostic(&mut self, message: &Message) -> Diagnostic {
        let primary = message.as_note();
        let location = self.location(&primary);

        // Path order: the message's own event, fixit events (suffixed),
        // note events, then exactly one trailing control record.
        let mut path = vec![self.event(&primary, message.message.clone())];
        for fixit in &message.fixits {
            let text = format!("{} (fixit)", fixit.message);
            path.push(self.event(fixit, text));
        }
        for note in &message.notes {
            path.push(self.event(note, note.message.clone()));
        }

        // Edges connect consecutive notes only: never fixits, never the
        // primary message. Fewer than two notes means zero edges.
        let mut edges = Vec::new();
        for pair in message.notes.windows(2) {
            let start = self.location(&pair[0]);
            let end = self.location(&pair[1]);
            edges.push(Edge {
                start: [start, start],
                end: [end, end],
            });
        }
        path.push(PathPiece::Control { edges });

        Diagnostic {
            location,
            check_name: message.checker.clone(),
            description: message.message.clone(),
            category: checker_category(&message.checker),
            report_type: REPORT_TYPE_CLANG_TIDY.to_string(),
            path,
        }
    }
}
