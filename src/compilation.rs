//! Compilation database loading.
//!
//! Reads a `compile_commands.json` file and turns each entry into a
//! [`BuildAction`] for the requested analyzer family. The original compile
//! command is stripped down to the options an analyzer can reuse: the
//! compiler itself, `-c`, `-o <file>`, and the source path are dropped,
//! everything else is forwarded after the `--` separator.

use crate::action::{AnalyzerKind, BuildAction};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One entry of `compile_commands.json`.
///
/// Databases carry either a single `command` string or an `arguments`
/// array; both shapes are accepted, `arguments` wins when both appear.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    fn argv(&self) -> Vec<String> {
        if let Some(arguments) = &self.arguments {
            return arguments.clone();
        }
        self.command
            .as_deref()
            .map(split_command)
            .unwrap_or_default()
    }
}

/// Split a shell command string into arguments, honoring quoting.
///
/// Compile commands regularly carry quoted defines like `-DMSG="a b"`;
/// splitting on whitespace alone would break those in two. Single quotes
/// preserve everything, double quotes allow `\"` and `\\` escapes, and a
/// backslash outside quotes escapes the next character.
fn split_command(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

/// Load a compilation database and convert every entry into a build action
/// for `analyzer`.
pub fn load_build_actions(path: &Path, analyzer: AnalyzerKind) -> Result<Vec<BuildAction>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read compilation database {}", path.display()))?;
    let commands: Vec<CompileCommand> = serde_json::from_str(&text)
        .with_context(|| format!("invalid compilation database {}", path.display()))?;
    Ok(commands
        .iter()
        .map(|cmd| to_build_action(cmd, analyzer))
        .collect())
}

fn to_build_action(cmd: &CompileCommand, analyzer: AnalyzerKind) -> BuildAction {
    let source = if cmd.file.is_absolute() {
        cmd.file.clone()
    } else {
        cmd.directory.join(&cmd.file)
    };
    BuildAction::new(
        vec![source.clone()],
        lang_of(&source),
        analyzer,
        analyzer_options(&cmd.argv(), &cmd.file),
        cmd.directory.clone(),
    )
}

/// Strip the compile argv down to analyzer-forwardable options.
fn analyzer_options(argv: &[String], source: &Path) -> Vec<String> {
    let source_name = source.to_string_lossy();
    let mut options = Vec::new();
    let mut args = argv.iter().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" => {}
            "-o" => {
                args.next();
            }
            a if a == source_name => {}
            _ => options.push(arg.clone()),
        }
    }
    options
}

/// Language inferred from the source extension, for the `-x` flag.
fn lang_of(source: &Path) -> &'static str {
    match source.extension().and_then(|e| e.to_str()) {
        Some("c") => "c",
        _ => "c++",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATABASE: &str = r#"[
        {
            "directory": "/proj/build",
            "file": "../src/main.cpp",
            "command": "g++ -DNDEBUG -I../include -c ../src/main.cpp -o main.o"
        },
        {
            "directory": "/proj/build",
            "file": "/proj/src/util.c",
            "arguments": ["cc", "-Wall", "-c", "/proj/src/util.c", "-o", "util.o"]
        }
    ]"#;

    fn load(json: &str) -> Vec<BuildAction> {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, json).unwrap();
        load_build_actions(&path, AnalyzerKind::ClangTidy).unwrap()
    }

    #[test]
    fn test_command_string_entry() {
        let actions = load(DATABASE);
        assert_eq!(actions.len(), 2);

        let first = &actions[0];
        assert_eq!(first.sources, vec![PathBuf::from("/proj/build/../src/main.cpp")]);
        assert_eq!(first.lang, "c++");
        assert_eq!(first.directory, PathBuf::from("/proj/build"));
        // Compiler, -c, -o pair, and the source are stripped.
        assert_eq!(
            first.analyzer_options,
            vec!["-DNDEBUG".to_string(), "-I../include".to_string()]
        );
    }

    #[test]
    fn test_arguments_array_entry() {
        let actions = load(DATABASE);
        let second = &actions[1];
        assert_eq!(second.sources, vec![PathBuf::from("/proj/src/util.c")]);
        assert_eq!(second.lang, "c");
        assert_eq!(second.analyzer_options, vec!["-Wall".to_string()]);
    }

    #[test]
    fn test_split_command_honors_quoting() {
        assert_eq!(
            split_command(r#"g++ -DMSG="a b" -c x.cpp -o x.o"#),
            vec!["g++", r#"-DMSG=a b"#, "-c", "x.cpp", "-o", "x.o"]
        );
        assert_eq!(
            split_command("cc '-DPATH=/tmp/my dir' main.c"),
            vec!["cc", "-DPATH=/tmp/my dir", "main.c"]
        );
        assert_eq!(
            split_command(r#"cc -DQUOTE="say \"hi\"" a.c"#),
            vec!["cc", r#"-DQUOTE=say "hi""#, "a.c"]
        );
        assert_eq!(
            split_command(r"cc -I/opt/my\ headers a.c"),
            vec!["cc", "-I/opt/my headers", "a.c"]
        );
        assert_eq!(split_command("  cc   a.c  "), vec!["cc", "a.c"]);
        assert_eq!(split_command("cc ''"), vec!["cc", ""]);
    }

    #[test]
    fn test_quoted_define_survives_into_analyzer_options() {
        let actions = load(
            r#"[{
                "directory": "/proj",
                "file": "/proj/a.cpp",
                "command": "g++ -DMSG=\"a b\" -c /proj/a.cpp -o a.o"
            }]"#,
        );
        assert_eq!(
            actions[0].analyzer_options,
            vec!["-DMSG=a b".to_string()]
        );
    }

    #[test]
    fn test_missing_database_is_error() {
        let err = load_build_actions(Path::new("/nonexistent/db.json"), AnalyzerKind::ClangTidy);
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_database_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_build_actions(&path, AnalyzerKind::ClangTidy).is_err());
    }

    #[test]
    fn test_empty_database_yields_no_actions() {
        assert!(load("[]").is_empty());
    }
}
