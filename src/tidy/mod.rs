//! clang-tidy diagnostic model and text-output conversion.
//!
//! The analyzer emits loosely structured text: a diagnostic line, a source
//! excerpt with a caret marker, optional fixit suggestions, and optional
//! note chains with their own excerpts. [`parser::OutputParser`] turns that
//! stream into [`Message`] values; [`document::DocumentBuilder`] folds
//! messages into the file-indexed [`document::DiagnosticDocument`] that
//! downstream tools consume.

pub mod document;
pub mod parser;

pub use document::{DiagnosticDocument, DocumentBuilder};
pub use parser::OutputParser;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One location-bound remark: a note attached to a diagnostic, or a fixit
/// suggestion stored as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Note {
    pub fn new(
        path: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path={}, line={}, column={}, message={}",
            self.path, self.line, self.column, self.message
        )
    }
}

/// One diagnostic finding with its explanatory chain.
///
/// `fixits` and `notes` preserve analyzer-reported order; the document
/// builder derives note edges strictly from that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub checker: String,
    pub fixits: Vec<Note>,
    pub notes: Vec<Note>,
}

impl Message {
    pub fn new(
        path: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
        checker: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            message: message.into(),
            checker: checker.into(),
            fixits: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// The message's own location viewed as a note, for event records.
    pub fn as_note(&self) -> Note {
        Note::new(self.path.clone(), self.line, self.column, self.message.clone())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path={}, line={}, column={}, message={}, checker={}, fixits={}, notes={}",
            self.path,
            self.line,
            self.column,
            self.message,
            self.checker,
            self.fixits.len(),
            self.notes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_structural_equality() {
        let a = Note::new("/a.cpp", 1, 2, "m");
        let b = Note::new("/a.cpp", 1, 2, "m");
        let c = Note::new("/a.cpp", 1, 3, "m");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_message_equality_includes_chains() {
        let mut a = Message::new("/a.cpp", 1, 2, "m", "misc-x");
        let b = Message::new("/a.cpp", 1, 2, "m", "misc-x");
        assert_eq!(a, b);
        a.notes.push(Note::new("/a.cpp", 3, 4, "n"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_as_note_copies_location() {
        let m = Message::new("/a.cpp", 10, 5, "unused variable 'x'", "misc-unused");
        let n = m.as_note();
        assert_eq!(n, Note::new("/a.cpp", 10, 5, "unused variable 'x'"));
    }
}
