use std::borrow::Cow;

use crate::http::headers::Headers;

/// The first line of a request.
///
/// The target is kept byte for byte as received; it is never validated or
/// decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase method token (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/index.html?x=1")
    pub target: Vec<u8>,
    /// Normalized HTTP version, always "1.1" for an accepted request
    pub version: String,
}

/// A parsed HTTP request.
///
/// Built up by [`RequestParser`](crate::http::parser::RequestParser) and only
/// handed out once parsing is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.line.method
    }

    /// The raw target bytes.
    pub fn target_bytes(&self) -> &[u8] {
        &self.line.target
    }

    /// The target as text, with invalid UTF-8 replaced. For logging and
    /// display; route on [`target_bytes`](Self::target_bytes).
    pub fn target(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.line.target)
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Declared `content-length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }
}
