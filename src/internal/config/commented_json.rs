// src/internal/config/commented_json.rs

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use super::loader::ConfigSourceError;

/// Remove comment syntax from a JSON-like document.
///
/// Recognized forms:
/// - `// ...` up to the end of the line
/// - `# ...` when `#` is the first non-blank character of a line
/// - `/* ... */` block comments, possibly spanning lines
///
/// String literals are copied untouched, including escaped quotes. Newlines
/// inside removed comments are kept so that parser positions still point at
/// the right line of the original file.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut state = State::Normal;
    let mut line_is_blank = true;

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '"' => {
                    state = State::InString;
                    line_is_blank = false;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '#' if line_is_blank => {
                    state = State::LineComment;
                }
                '\n' => {
                    line_is_blank = true;
                    out.push(c);
                }
                _ => {
                    if !c.is_whitespace() {
                        line_is_blank = false;
                    }
                    out.push(c);
                }
            },
            State::InString => {
                out.push(c);
                match c {
                    '\\' => state = State::InStringEscape,
                    '"' => state = State::Normal,
                    _ => {}
                }
            }
            State::InStringEscape => {
                out.push(c);
                state = State::InString;
            }
            State::LineComment => {
                if c == '\n' {
                    line_is_blank = true;
                    state = State::Normal;
                    out.push(c);
                }
            }
            State::BlockComment => match c {
                '*' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::Normal;
                }
                '\n' => {
                    line_is_blank = true;
                    out.push(c);
                }
                _ => {}
            },
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InString,
    InStringEscape,
    LineComment,
    BlockComment,
}

/// Parse commented JSON text into a top-level object.
pub fn parse_commented_json(text: &str, path: &Path) -> Result<Map<String, Value>, ConfigSourceError> {
    let stripped = strip_comments(text);
    let value: Value =
        serde_json::from_str(&stripped).map_err(|source| ConfigSourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigSourceError::NotAnObject {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

/// Read and parse a commented JSON file.
pub fn load_commented_json(path: &Path) -> Result<Map<String, Value>, ConfigSourceError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigSourceError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_commented_json(&text, path)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
