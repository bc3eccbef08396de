//! Header table and header-line parser.
//!
//! Keys are always stored lowercased, so lookups are case-insensitive.
//! A repeated header name is merged into a single value joined by a bare
//! comma: `Set-Person: a` then `Set-Person: b` gives `set-person: a,b`.

use std::collections::HashMap;

use crate::http::error::ParseError;
use crate::http::CRLF;

const VALUE_SEPARATOR: char = ',';

/// Header names that may appear on the wire, per the RFC 7230 token charset.
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|".contains(&b)
}

/// Field values may carry obs-text (0x80-0xFF). UTF-8 is taken as is;
/// anything else is read as ISO-8859-1, which maps every byte to a char.
fn decode_value(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(value) => value.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the front of `buf`.
    ///
    /// Returns `(consumed, terminated)`:
    /// - `(0, false)` when no full line is buffered yet
    /// - `(2, true)` for the blank line ending the header block
    /// - `(line_len + 2, false)` after storing a header
    pub fn parse(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = find_crlf(buf) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((2, true));
        }

        let line = &buf[..line_end];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::HeaderFormat { offset: line_end })?;
        let (name, value) = (&line[..colon], &line[colon + 1..]);

        if name.ends_with(b" ") {
            return Err(ParseError::HeaderFormat { offset: colon - 1 });
        }

        let name = name.trim_ascii();
        if name.is_empty() || !name.iter().all(|&b| is_token_char(b)) {
            return Err(ParseError::InvalidHeaderName {
                name: String::from_utf8_lossy(name).into_owned(),
            });
        }

        let value = decode_value(value.trim_ascii());

        self.append(&String::from_utf8_lossy(name), &value);
        Ok((line_end + 2, false))
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Inserts or replaces a header.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Adds a value, merging it into an existing one with a comma.
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .and_modify(|old| {
                old.push(VALUE_SEPARATOR);
                old.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Sets the headers every plain response carries, then overlays `overrides`.
    pub fn set_defaults(&mut self, content_length: usize, overrides: &[(&str, &str)]) {
        self.insert("content-length", content_length.to_string());
        self.insert("connection", "close");
        self.insert("content-type", "text/plain");
        self.merge(overrides);
    }

    /// Overlays `overrides`, replacing existing values.
    pub fn merge(&mut self, overrides: &[(&str, &str)]) {
        for (name, value) in overrides {
            self.insert(name, *value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}
