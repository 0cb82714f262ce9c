//! Composite wire format for stored values
//!
//! Composite settings (lists and maps) are persisted as opaque strings in the
//! same `value` column as plain scalars, so reads must classify a stored
//! string before decoding it. This module provides:
//! - `looks_serialized` - byte-oriented classifier for the wire format
//! - `to_string` - serializer for composite values
//! - `from_str` - recursive-descent parser back to a value
//!
//! The format is closed: `N;`, `b:<0|1>;`, `i:<int>;`, `d:<float>;`,
//! `s:<bytelen>:"<bytes>";`, lists as `a:<n>:{<key><value>...}` and maps as
//! `O:8:"stdClass":<n>:{<key><value>...}`. Nested composites are allowed;
//! cyclic values are unrepresentable.

use crate::errors::{ParametresError, Result};
use serde_json::{Map, Number, Value};
use std::fmt::Write as _;

/// Check whether a stored string is a serialized composite, strict mode.
///
/// Strict mode requires the payload to be anchored at both ends and is what
/// the decode path uses. See `looks_serialized_with` for the full rules.
pub fn looks_serialized(data: &str) -> bool {
    looks_serialized_with(data, true)
}

/// Check whether a stored string is a serialized composite.
///
/// The classification is heuristic by necessity: composite payloads share the
/// `value` column with arbitrary user strings, and a plain string such as
/// `"hello world"` must never be taken for a payload. The checks are
/// byte-oriented and case-sensitive:
///
/// 1. Surrounding whitespace is ignored.
/// 2. The literal `N;` (serialized null) classifies as serialized.
/// 3. Anything shorter than 4 bytes does not.
/// 4. The second byte must be `:`.
/// 5. Strict: the last byte must be `;` or `}`. Relaxed: a `;` must occur at
///    index >= 3 or a `}` at index >= 4.
/// 6. The first byte selects the shape: `s` requires a `"` two bytes before
///    the end (strict) or anywhere (relaxed) and then, like `a` and `O`, the
///    counted prefix `<tag>:<digits>:`; `b`, `i` and `d` require
///    `<tag>:<numeric>;`, anchored at the end in strict mode. Any other
///    leading byte fails.
pub fn looks_serialized_with(data: &str, strict: bool) -> bool {
    let data = data.trim();
    if data == "N;" {
        return true;
    }

    let bytes = data.as_bytes();
    if bytes.len() < 4 {
        return false;
    }
    if bytes[1] != b':' {
        return false;
    }

    if strict {
        let last = bytes[bytes.len() - 1];
        if last != b';' && last != b'}' {
            return false;
        }
    } else {
        let semicolon = data.find(';');
        let brace = data.find('}');
        // One of ; or } must exist, and neither may sit in the opening bytes.
        if semicolon.is_none() && brace.is_none() {
            return false;
        }
        if matches!(semicolon, Some(pos) if pos < 3) {
            return false;
        }
        if matches!(brace, Some(pos) if pos < 4) {
            return false;
        }
    }

    match bytes[0] {
        b's' => {
            if strict {
                if bytes[bytes.len() - 2] != b'"' {
                    return false;
                }
            } else if !data.contains('"') {
                return false;
            }
            has_counted_prefix(bytes)
        }
        b'a' | b'O' => has_counted_prefix(bytes),
        b'b' | b'i' | b'd' => has_numeric_shape(bytes, strict),
        _ => false,
    }
}

/// `<tag>:<digits>:` with at least one digit
fn has_counted_prefix(bytes: &[u8]) -> bool {
    let mut i = 2;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i > 2 && i < bytes.len() && bytes[i] == b':'
}

/// `<tag>:<numeric>;`, where numeric bytes are `[0-9.E+-]`
fn has_numeric_shape(bytes: &[u8], strict: bool) -> bool {
    let mut i = 2;
    while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.' | b'E' | b'+' | b'-') {
        i += 1;
    }
    if i == 2 || i >= bytes.len() || bytes[i] != b';' {
        return false;
    }
    !strict || i == bytes.len() - 1
}

/// Serialize a value into the composite wire format.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("N;"),
        Value::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            let _ = write!(out, "a:{}:{{", items.len());
            for (index, item) in items.iter().enumerate() {
                let _ = write!(out, "i:{};", index);
                write_value(out, item);
            }
            out.push('}');
        }
        Value::Object(map) => {
            let _ = write!(out, "O:8:\"stdClass\":{}:{{", map.len());
            for (key, item) in map {
                write_string(out, key);
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "i:{};", i);
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "i:{};", u);
    } else {
        let _ = write!(out, "d:{};", n.as_f64().unwrap_or(0.0));
    }
}

fn write_string(out: &mut String, s: &str) {
    // Length is in bytes, not chars; the payload is embedded verbatim.
    let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
}

/// Parse a serialized composite back into a value.
///
/// Accepts every shape `to_string` emits, nested arbitrarily. An `a:` payload
/// whose keys are exactly `0..n` in order decodes as a list; any other key
/// set decodes as a map with stringified keys.
///
/// # Errors
///
/// Returns `ParametresError::Serialization` on any malformed payload,
/// including trailing bytes after a complete value.
pub fn from_str(data: &str) -> Result<Value> {
    let mut parser = Parser {
        bytes: data.trim().as_bytes(),
        pos: 0,
    };
    let value = parser.parse_value()?;
    if parser.pos != parser.bytes.len() {
        return Err(parser.malformed("trailing bytes after value"));
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn malformed(&self, reason: &str) -> ParametresError {
        ParametresError::Serialization {
            message: format!("{} at byte {}", reason, self.pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.malformed(&format!("expected '{}'", expected as char))),
        }
    }

    fn expect_str(&mut self, expected: &str) -> Result<()> {
        for &b in expected.as_bytes() {
            self.expect(b)?;
        }
        Ok(())
    }

    /// Raw bytes up to (excluding) the next `;`, consuming the terminator
    fn until_semicolon(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b';' {
                let raw = std::str::from_utf8(&self.bytes[start..self.pos])
                    .map_err(|_| self.malformed("invalid utf-8 in literal"))?;
                self.pos += 1;
                return Ok(raw);
            }
            self.pos += 1;
        }
        Err(self.malformed("unterminated literal"))
    }

    fn parse_usize(&mut self) -> Result<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.malformed("expected a length"));
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| self.malformed("length out of range"))
    }

    /// `<len>:"<len bytes>"` - the length counts bytes, so the payload may
    /// contain quotes and separators
    fn parse_string_body(&mut self) -> Result<String> {
        let len = self.parse_usize()?;
        self.expect_str(":\"")?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.malformed("string length exceeds payload"))?;
        let raw = std::str::from_utf8(&self.bytes[self.pos..end])
            .map_err(|_| self.malformed("invalid utf-8 in string"))?
            .to_string();
        self.pos = end;
        self.expect(b'"')?;
        Ok(raw)
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'N') => {
                self.expect_str("N;")?;
                Ok(Value::Null)
            }
            Some(b'b') => {
                self.expect_str("b:")?;
                let flag = match self.peek() {
                    Some(b'0') => false,
                    Some(b'1') => true,
                    _ => return Err(self.malformed("expected boolean 0 or 1")),
                };
                self.pos += 1;
                self.expect(b';')?;
                Ok(Value::Bool(flag))
            }
            Some(b'i') => {
                self.expect_str("i:")?;
                let raw = self.until_semicolon()?;
                let parsed: i64 = raw
                    .parse()
                    .map_err(|_| self.malformed("invalid integer literal"))?;
                Ok(Value::from(parsed))
            }
            Some(b'd') => {
                self.expect_str("d:")?;
                let raw = self.until_semicolon()?;
                let parsed: f64 = raw
                    .parse()
                    .map_err(|_| self.malformed("invalid float literal"))?;
                Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| self.malformed("non-finite float literal"))
            }
            Some(b's') => {
                self.expect_str("s:")?;
                let body = self.parse_string_body()?;
                self.expect(b';')?;
                Ok(Value::String(body))
            }
            Some(b'a') => {
                self.expect_str("a:")?;
                let entries = self.parse_entries()?;
                Ok(collect_composite(entries))
            }
            Some(b'O') => {
                self.expect_str("O:")?;
                // Class name is carried for shape only; the value model is a map
                let _class = self.parse_string_body()?;
                self.expect(b':')?;
                let entries = self.parse_entries()?;
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.into_string(), value);
                }
                Ok(Value::Object(map))
            }
            _ => Err(self.malformed("unknown value tag")),
        }
    }

    /// `<count>:{<key><value>...}`
    fn parse_entries(&mut self) -> Result<Vec<(EntryKey, Value)>> {
        let count = self.parse_usize()?;
        self.expect_str(":{")?;
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.parse_key()?;
            let value = self.parse_value()?;
            entries.push((key, value));
        }
        self.expect(b'}')?;
        Ok(entries)
    }

    fn parse_key(&mut self) -> Result<EntryKey> {
        match self.peek() {
            Some(b'i') => {
                self.expect_str("i:")?;
                let raw = self.until_semicolon()?;
                let parsed: i64 = raw
                    .parse()
                    .map_err(|_| self.malformed("invalid integer key"))?;
                Ok(EntryKey::Index(parsed))
            }
            Some(b's') => {
                self.expect_str("s:")?;
                let body = self.parse_string_body()?;
                self.expect(b';')?;
                Ok(EntryKey::Name(body))
            }
            _ => Err(self.malformed("expected an integer or string key")),
        }
    }
}

enum EntryKey {
    Index(i64),
    Name(String),
}

impl EntryKey {
    fn into_string(self) -> String {
        match self {
            EntryKey::Index(i) => i.to_string(),
            EntryKey::Name(s) => s,
        }
    }
}

/// Sequential integer keys mean a list; anything else is a map.
fn collect_composite(entries: Vec<(EntryKey, Value)>) -> Value {
    let sequential = entries
        .iter()
        .enumerate()
        .all(|(index, (key, _))| matches!(key, EntryKey::Index(i) if *i == index as i64));

    if sequential {
        Value::Array(entries.into_iter().map(|(_, value)| value).collect())
    } else {
        let mut map = Map::new();
        for (key, value) in entries {
            map.insert(key.into_string(), value);
        }
        Value::Object(map)
    }
}
