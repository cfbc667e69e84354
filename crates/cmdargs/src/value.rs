//! Option value grammar.
//!
//! A raw option value is one of:
//! - a plain scalar (`01`, `a\,b`, `true`, `null`)
//! - a path (`C:/Users/name`, `/srv/data/`), kept verbatim
//! - a flat map of `name:value` / bare `name` entries separated by commas
//!   (`port:3000,secure,url:https\://localhost`)
//!
//! `\,` and `\:` are the only escape sequences. Any other backslash is literal.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

const ESCAPE: char = '\\';
const ENTRY_SEP: char = ',';
const PAIR_SEP: char = ':';

/// The raw input handed to [`parse_value`] for a named option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    /// The option had no value token (`--verbose` at the end of argv).
    Switch,
    /// The trimmed text of the token following the option.
    Text(&'a str),
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Null,
    /// The user literally typed `undefined`. Distinct from a missing option.
    Undefined,
    Text(String),
    Map(RecordMap),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RecordMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            // JSON has no `undefined`; containers that care skip it.
            Self::Null | Self::Undefined => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Map(m) => m.serialize(serializer),
        }
    }
}

/// A single entry value inside a [`RecordMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubValue {
    /// Bare `name` with no `:value`.
    True,
    Text(String),
}

impl SubValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::True => None,
            Self::Text(s) => Some(s.as_str()),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }
}

impl Serialize for SubValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::True => serializer.serialize_bool(true),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Insertion-ordered `name -> value` entries parsed from one option value.
///
/// Keys are trimmed but kept in their escaped form; only values are unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMap {
    entries: IndexMap<String, SubValue>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated key keeps its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: SubValue) -> Option<SubValue> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&SubValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render back into the raw `name:value,name` form accepted by [`parse_value`].
    ///
    /// A key or value ending in `\` gets a trailing space so the backslash
    /// does not escape the delimiter written after it; parsing trims it again.
    ///
    /// Re-parsing the output gives back an equal map except when the output
    /// has no unescaped delimiter (a single bare key, read as text) or has
    /// the path shape (e.g. `{"/a": "b"}` renders as the path `/a:b`).
    pub fn to_raw(&self) -> String {
        let mut out = String::new();
        for (idx, (key, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                out.push(ENTRY_SEP);
            }
            push_part(&mut out, key);
            if let SubValue::Text(text) = value {
                out.push(PAIR_SEP);
                push_part(&mut out, &escape(text));
            }
        }
        out
    }
}

fn push_part(out: &mut String, part: &str) {
    out.push_str(part);
    if part.ends_with(ESCAPE) {
        out.push(' ');
    }
}

impl fmt::Display for RecordMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl Serialize for RecordMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, SubValue)> for RecordMap {
    fn from_iter<T: IntoIterator<Item = (K, SubValue)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Parse the raw value of a named option.
///
/// Decision order: switch passthrough, plain scalar (no unescaped `,`/`:`),
/// path shape, then structured map.
pub fn parse_value(raw: RawValue<'_>) -> Value {
    let text = match raw {
        RawValue::Switch => return Value::Bool(true),
        RawValue::Text(text) => text,
    };

    if !has_unescaped(text, PAIR_SEP) && !has_unescaped(text, ENTRY_SEP) {
        return parse_scalar(text);
    }

    if looks_like_path(text) {
        tracing::trace!(value = text, "option value kept as path");
        return Value::Text(text.to_string());
    }

    Value::Map(parse_map(text))
}

fn parse_scalar(text: &str) -> Value {
    let text = unescape(text);
    match text.as_ref() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "undefined" => Value::Undefined,
        _ => Value::Text(text.into_owned()),
    }
}

/// Strip leading and trailing whitespace, including U+FEFF and excluding
/// U+0085, matching what JavaScript's `String.prototype.trim` removes.
pub fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}'))
}

/// Whether `delim` occurs without a backslash directly in front of it.
fn has_unescaped(text: &str, delim: char) -> bool {
    let mut prev = None;
    for c in text.chars() {
        if c == delim && prev != Some(ESCAPE) {
            return true;
        }
        prev = Some(c);
    }
    false
}

/// Replace `\,` with `,` and `\:` with `:`.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains(ESCAPE) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(&next) = chars.peek() {
                if next == ENTRY_SEP || next == PAIR_SEP {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Escape `,` and `:` so `text` survives as a single map value.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == ENTRY_SEP || c == PAIR_SEP {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Best-effort filesystem path shape check.
///
/// Accepts an optional drive prefix (`C:`), one or more `/segment` or
/// `\segment` groups, and an optional trailing separator. This only exists
/// so that `C:/Users/name` is not read as the map `{C: "/Users/name"}`; it is
/// not a path validator.
pub fn looks_like_path(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        i = 2;
    }

    let is_sep = |b: u8| b == b'/' || b == b'\\';
    let mut groups = 0usize;
    while i < bytes.len() {
        if !is_sep(bytes[i]) {
            return false;
        }
        i += 1;
        let start = i;
        while i < bytes.len() && !is_sep(bytes[i]) {
            i += 1;
        }
        if i == start {
            // Only a single trailing separator may stand alone.
            return groups > 0 && i == bytes.len();
        }
        groups += 1;
    }
    groups > 0
}

fn parse_map(text: &str) -> RecordMap {
    let mut map = RecordMap::new();
    let mut rest = text;

    while !rest.is_empty() {
        let key_len = segment_len(rest);
        if key_len == 0 {
            // Stray delimiter: skip it and look for the next segment.
            let skip = rest.chars().next().map_or(1, char::len_utf8);
            rest = &rest[skip..];
            continue;
        }

        let key = trim(&rest[..key_len]);
        rest = &rest[key_len..];

        let mut value = SubValue::True;
        if let Some(after) = rest.strip_prefix(PAIR_SEP) {
            let value_len = segment_len(after);
            if value_len > 0 {
                let unescaped = unescape(&after[..value_len]);
                let trimmed = trim(&unescaped);
                if !trimmed.is_empty() {
                    value = SubValue::Text(trimmed.to_string());
                }
                rest = &after[value_len..];
            }
        }

        tracing::trace!(key, value = ?value, "map entry");
        map.insert(key, value);
    }

    map
}

/// Byte length of the longest prefix made of `\,`, `\:` or any char other
/// than an unescaped `,`/`:`.
fn segment_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if matches!(bytes.get(i + 1), Some(b',') | Some(b':')) => i += 2,
            b',' | b':' => break,
            _ => i += 1,
        }
    }
    i
}
