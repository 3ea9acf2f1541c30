//! Parser for Helm `--set` style expressions.
//!
//! Covers the part of Helm's strvals grammar that charts rely on:
//! dotted keys (`a.b.c`), list indexes (`a.b[0].c`), comma-separated
//! assignments, `{x,y}` list literals and backslash escapes.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Largest list index a key may address.
pub const MAX_INDEX: usize = 65536;

/// How the right-hand side of an assignment is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `--set`: `true`, `false`, `null` and integers are typed.
    Typed,
    /// `--set-string`: every value stays a string.
    String,
    /// `--set-json`: the value is a single JSON document.
    Json,
    /// `--set-file`: the value is a path whose content becomes the value.
    File,
    /// `--set-literal`: everything after the first `=` is taken verbatim.
    Literal,
}

#[derive(Debug, Error)]
pub enum StrvalsError {
    #[error("key \"{0}\" has no value")]
    MissingValue(String),

    #[error("empty key segment in \"{0}\"")]
    EmptyKey(String),

    #[error("invalid list index in key \"{0}\"")]
    InvalidIndex(String),

    #[error("index {index} in key \"{key}\" exceeds the maximum of {}", MAX_INDEX)]
    IndexTooLarge { key: String, index: usize },

    #[error("list value for key \"{0}\" is missing its closing brace")]
    UnterminatedList(String),

    #[error("unexpected input after the value of key \"{0}\"")]
    TrailingInput(String),

    #[error("invalid JSON value for key \"{key}\": {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for key \"{key}\" cannot be converted: {source}")]
    Convert {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read {path} for key \"{key}\": {source}")]
    File {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Parse `expression` and write every assignment into `target`.
///
/// `target` is turned into a mapping if it is not one already.
pub fn parse_into(expression: &str, target: &mut Value, kind: ValueKind) -> Result<(), StrvalsError> {
    let mut parser = Parser {
        input: expression,
        pos: 0,
    };

    while !parser.at_end() {
        let (raw_key, stop) = parser.read_until(&['=', ','], true);
        if stop != Some('=') {
            if raw_key.is_empty() {
                continue;
            }
            return Err(StrvalsError::MissingValue(raw_key));
        }

        let path = parse_key(&raw_key)?;
        let value = parser.read_value(&raw_key, kind)?;
        set_path(target, &path, value);
    }

    Ok(())
}

/// Parse a single expression into a fresh mapping.
pub fn parse(expression: &str, kind: ValueKind) -> Result<Value, StrvalsError> {
    let mut value = Value::Mapping(Mapping::new());
    parse_into(expression, &mut value, kind)?;
    Ok(value)
}

/// Split a raw key into path segments.
pub fn parse_key(raw: &str) -> Result<Vec<Segment>, StrvalsError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut last_was_dot = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                last_was_dot = false;
            }
            '.' => {
                if !current.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                } else if !matches!(segments.last(), Some(Segment::Index(_))) {
                    return Err(StrvalsError::EmptyKey(raw.to_string()));
                }
                last_was_dot = true;
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                } else if segments.is_empty() || last_was_dot {
                    return Err(StrvalsError::EmptyKey(raw.to_string()));
                }

                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) => digits.push(d),
                        None => return Err(StrvalsError::InvalidIndex(raw.to_string())),
                    }
                }
                let index: usize = digits
                    .trim()
                    .parse()
                    .map_err(|_| StrvalsError::InvalidIndex(raw.to_string()))?;
                if index > MAX_INDEX {
                    return Err(StrvalsError::IndexTooLarge {
                        key: raw.to_string(),
                        index,
                    });
                }
                segments.push(Segment::Index(index));
                last_was_dot = false;
            }
            _ => {
                current.push(c);
                last_was_dot = false;
            }
        }
    }

    if !current.is_empty() {
        segments.push(Segment::Key(current));
    } else if last_was_dot || segments.is_empty() {
        return Err(StrvalsError::EmptyKey(raw.to_string()));
    }

    Ok(segments)
}

/// Write `value` at `path`, creating intermediate maps and lists.
pub fn set_path(target: &mut Value, path: &[Segment], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *target = value;
        return;
    };

    match first {
        Segment::Key(key) => {
            if !target.is_mapping() {
                *target = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(map) = target {
                let entry = map.entry(Value::String(key.clone())).or_insert(Value::Null);
                set_path(entry, rest, value);
            }
        }
        Segment::Index(index) => {
            if !target.is_sequence() {
                *target = Value::Sequence(Vec::new());
            }
            if let Value::Sequence(list) = target {
                if list.len() <= *index {
                    list.resize(index + 1, Value::Null);
                }
                set_path(&mut list[*index], rest, value);
            }
        }
    }
}

/// Type a `--set` scalar the way Helm does.
pub fn typed_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if raw == "0" {
        return Value::Number(0.into());
    }
    // Leading zeros keep the value a string (e.g. "0755", "007").
    if !raw.is_empty() && !raw.starts_with('0') {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    Value::String(raw.to_string())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Read up to (and consume) the first unescaped stop character.
    ///
    /// With `keep_escapes`, backslashes are preserved so the key parser
    /// can still tell an escaped dot from a separator.
    fn read_until(&mut self, stops: &[char], keep_escapes: bool) -> (String, Option<char>) {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == '\\' {
                if keep_escapes {
                    out.push(c);
                }
                if let Some(next) = self.bump() {
                    out.push(next);
                }
                continue;
            }
            if stops.contains(&c) {
                return (out, Some(c));
            }
            out.push(c);
        }
        (out, None)
    }

    fn read_value(&mut self, key: &str, kind: ValueKind) -> Result<Value, StrvalsError> {
        match kind {
            ValueKind::Literal => {
                let value = self.rest().to_string();
                self.pos = self.input.len();
                Ok(Value::String(value))
            }
            ValueKind::Json => self.read_json(key),
            ValueKind::Typed | ValueKind::String => {
                if self.peek() == Some('{') {
                    self.bump();
                    return self.read_list(key, kind);
                }
                let (raw, _) = self.read_until(&[','], false);
                Ok(scalar(&raw, kind))
            }
            ValueKind::File => {
                let (raw, _) = self.read_until(&[','], false);
                let path = PathBuf::from(&raw);
                let content = std::fs::read_to_string(&path).map_err(|source| StrvalsError::File {
                    key: key.to_string(),
                    path,
                    source,
                })?;
                Ok(Value::String(content))
            }
        }
    }

    fn read_list(&mut self, key: &str, kind: ValueKind) -> Result<Value, StrvalsError> {
        let mut items = Vec::new();
        loop {
            let (raw, stop) = self.read_until(&[',', '}'], false);
            match stop {
                Some(',') => items.push(scalar(&raw, kind)),
                Some('}') => {
                    if !(raw.is_empty() && items.is_empty()) {
                        items.push(scalar(&raw, kind));
                    }
                    break;
                }
                _ => return Err(StrvalsError::UnterminatedList(key.to_string())),
            }
        }
        self.expect_separator(key)?;
        Ok(Value::Sequence(items))
    }

    fn read_json(&mut self, key: &str) -> Result<Value, StrvalsError> {
        let mut stream = serde_json::Deserializer::from_str(self.rest()).into_iter::<serde_json::Value>();
        let json = match stream.next() {
            Some(Ok(json)) => json,
            Some(Err(source)) => {
                return Err(StrvalsError::Json {
                    key: key.to_string(),
                    source,
                });
            }
            None => return Err(StrvalsError::MissingValue(key.to_string())),
        };
        self.pos += stream.byte_offset();
        self.expect_separator(key)?;

        serde_yaml::to_value(json).map_err(|source| StrvalsError::Convert {
            key: key.to_string(),
            source,
        })
    }

    fn expect_separator(&mut self, key: &str) -> Result<(), StrvalsError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        match self.bump() {
            None | Some(',') => Ok(()),
            Some(_) => Err(StrvalsError::TrailingInput(key.to_string())),
        }
    }
}

fn scalar(raw: &str, kind: ValueKind) -> Value {
    match kind {
        ValueKind::Typed => typed_value(raw),
        _ => Value::String(raw.to_string()),
    }
}
