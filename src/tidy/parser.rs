//! Parser for clang-tidy console output.
//!
//! The input grammar is a de facto wire format shared with the analyzer:
//!
//! ```text
//! <path>:<line>:<column>: <severity>: <text> [<checker-name>]   message line
//! <path>:<line>:<column>: note: <text>                          note line
//! <source excerpt>                                               code line
//!     ^                                                          arrow line
//! <anything else>                                                fixit line
//! ```
//!
//! Parsing runs as an explicit state machine over a single-line lookahead
//! cursor. Lines that violate the grammar at an expected point are recorded
//! as anomalies and parsing resynchronizes; a malformed stream never aborts
//! the conversion, the partially built message is still emitted.

use crate::tidy::{Message, Note};
use regex::Regex;
use std::io::BufRead;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

fn message_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Path up to the first :line:column: run, severity token, message
        // text, then the last bracketed token on the line as checker name.
        Regex::new(
            r"^(?P<path>\S+):(?P<line>\d+):(?P<column>\d+): (?P<severity>\w+):(?P<message>[\S \t]+)\s*\[(?P<checker>.*)\]",
        )
        .expect("message line regex is valid")
    })
}

fn note_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<path>\S+):(?P<line>\d+):(?P<column>\d+): note:(?P<message>.*)")
            .expect("note line regex is valid")
    })
}

fn is_message_line(line: &str) -> bool {
    message_line_re().is_match(line)
}

fn is_note_line(line: &str) -> bool {
    note_line_re().is_match(line)
}

/// Absolute-path normalization for reported locations.
///
/// Relative paths are resolved against the current directory; `.` and `..`
/// components are removed lexically (the file may not exist on the machine
/// doing the conversion, so no filesystem resolution).
fn absolute_path(path: &str) -> String {
    let raw = Path::new(path);
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(raw))
            .unwrap_or_else(|_| raw.to_path_buf())
    };
    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned.to_string_lossy().into_owned()
}

/// Single-line lookahead over the input stream. The parser always has
/// exactly the next unconsumed line available; no pushback is needed.
struct LineCursor<I: Iterator<Item = String>> {
    lines: I,
    current: Option<String>,
}

impl<I: Iterator<Item = String>> LineCursor<I> {
    fn new(mut lines: I) -> Self {
        let current = lines.next();
        Self { lines, current }
    }

    fn advance(&mut self) {
        self.current = self.lines.next();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Scanning for the next message line; anything else is discarded.
    ExpectMessage,
    /// Right after a message line: expect its source excerpt + arrow.
    ExpectCode,
    /// After the message's code block: fixit lines until a note or the
    /// next message shows up.
    ExpectFixitsOrNotes,
    /// After a note line: expect the note's own code block, then either
    /// another note, the next message, or the end of this diagnostic.
    ExpectNoteCode,
}

/// Parser for clang-tidy console output.
#[derive(Debug, Default)]
pub struct OutputParser {
    messages: Vec<Message>,
    anomalies: Vec<String>,
}

impl OutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a clang-tidy output dump (redirected output) from a file.
    pub fn parse_messages_from_file(&mut self, path: &Path) -> anyhow::Result<&[Message]> {
        use anyhow::Context;
        let file = std::fs::File::open(path)
            .with_context(|| format!("cannot open analyzer output: {}", path.display()))?;
        let lines = std::io::BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("cannot read analyzer output: {}", path.display()))?;
        Ok(self.parse_messages(lines))
    }

    /// Parse clang-tidy output given as one string.
    pub fn parse_string(&mut self, text: &str) -> &[Message] {
        self.parse_messages(text.lines().map(str::to_string))
    }

    /// Parse the given line stream, appending to any previously parsed
    /// messages. Returns the full accumulated message list.
    pub fn parse_messages<L>(&mut self, lines: L) -> &[Message]
    where
        L: IntoIterator<Item = String>,
    {
        let mut cursor = LineCursor::new(lines.into_iter());
        let mut state = ParseState::ExpectMessage;
        let mut pending: Option<Message> = None;

        loop {
            let Some(line) = cursor.current.clone() else {
                break;
            };
            match state {
                ParseState::ExpectMessage => {
                    if let Some(message) = self.match_message(&line) {
                        if let Some(done) = pending.take() {
                            self.messages.push(done);
                        }
                        pending = Some(message);
                        cursor.advance();
                        state = ParseState::ExpectCode;
                    } else {
                        // Lines before the first message (or between
                        // diagnostics after a resync) are silently skipped.
                        cursor.advance();
                    }
                }
                ParseState::ExpectCode => {
                    self.consume_code_block(&mut cursor);
                    state = ParseState::ExpectFixitsOrNotes;
                }
                ParseState::ExpectFixitsOrNotes => {
                    if is_message_line(&line) {
                        state = ParseState::ExpectMessage;
                    } else if let Some(note) = self.match_note(&line) {
                        if let Some(message) = pending.as_mut() {
                            message.notes.push(note);
                        }
                        cursor.advance();
                        state = ParseState::ExpectNoteCode;
                    } else {
                        // Anything else is a fixit entry. Blank lines are
                        // skipped without ending the fixit run.
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            if let Some(message) = pending.as_mut() {
                                let column =
                                    line.find(trimmed).map(|o| o as u32).unwrap_or(0) + 1;
                                message.fixits.push(Note::new(
                                    message.path.clone(),
                                    message.line,
                                    column,
                                    trimmed,
                                ));
                            }
                        }
                        cursor.advance();
                    }
                }
                ParseState::ExpectNoteCode => {
                    self.consume_code_block(&mut cursor);
                    let Some(next) = cursor.current.clone() else {
                        break;
                    };
                    if is_message_line(&next) {
                        state = ParseState::ExpectMessage;
                    } else if let Some(note) = self.match_note(&next) {
                        if let Some(message) = pending.as_mut() {
                            message.notes.push(note);
                        }
                        cursor.advance();
                        // Stay in ExpectNoteCode for this note's excerpt.
                    } else {
                        self.record_anomaly("unexpected line after note", &next);
                        cursor.advance();
                        state = ParseState::ExpectMessage;
                    }
                }
            }
        }

        // End of input flushes the in-progress message.
        if let Some(done) = pending.take() {
            self.messages.push(done);
        }
        &self.messages
    }

    /// Messages parsed so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the parser, yielding the parsed messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Grammar violations observed while parsing. Anomalies never abort
    /// the conversion; they are kept for diagnostics reporting.
    pub fn anomalies(&self) -> &[String] {
        &self.anomalies
    }

    fn match_message(&self, line: &str) -> Option<Message> {
        let caps = message_line_re().captures(line)?;
        Some(Message::new(
            absolute_path(&caps["path"]),
            caps["line"].parse().unwrap_or(0),
            caps["column"].parse().unwrap_or(0),
            caps["message"].trim(),
            caps["checker"].trim(),
        ))
    }

    fn match_note(&self, line: &str) -> Option<Note> {
        let caps = note_line_re().captures(line)?;
        Some(Note::new(
            absolute_path(&caps["path"]),
            caps["line"].parse().unwrap_or(0),
            caps["column"].parse().unwrap_or(0),
            caps["message"].trim(),
        ))
    }

    /// Consume one source-excerpt line and one arrow line.
    ///
    /// Either expectation can be violated: the offending line is left
    /// unconsumed so the state machine can reclassify it.
    fn consume_code_block<I: Iterator<Item = String>>(&mut self, cursor: &mut LineCursor<I>) {
        let Some(line) = cursor.current.clone() else {
            return;
        };
        if is_message_line(&line) || is_note_line(&line) {
            self.record_anomaly("expected a code line", &line);
            return;
        }
        cursor.advance();
        let Some(arrow) = cursor.current.clone() else {
            return;
        };
        if !arrow.contains('^') {
            self.record_anomaly("expected an arrow line", &arrow);
            return;
        }
        cursor.advance();
    }

    fn record_anomaly(&mut self, expectation: &str, line: &str) {
        self.anomalies.push(format!("{}: {}", expectation, line));
    }
}
