use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::http::error::{ParseError, RequestError};
use crate::http::headers::find_crlf;
use crate::http::request::{Request, RequestLine};

/// Starting size of the read buffer. It doubles whenever it fills up
/// without the parser being able to consume anything.
pub const INITIAL_BUFFER_SIZE: usize = 1024;

const SUPPORTED_VERSION: &str = "HTTP/1.1";

/// Parser progress. Only ever moves forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingRequestLine,
    AwaitingHeaders,
    AwaitingBody,
    Complete,
}

/// Incremental request parser.
///
/// The parser does not own any input. Each call to [`feed`](Self::feed) gets
/// every byte that is buffered but not yet consumed, and reports how many of
/// them it used. Zero means it needs more input (or, for the transition out
/// of the headers phase, just another call).
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    request: Request,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::AwaitingRequestLine,
            request: Request::default(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ParseState::Complete
    }

    /// The request parsed so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Hands out the request, but only once parsing has finished.
    pub fn into_request(self) -> Option<Request> {
        self.is_complete().then_some(self.request)
    }

    /// Feeds buffered input. `eof` signals that no more bytes will arrive.
    pub fn feed(&mut self, buf: &[u8], eof: bool) -> Result<usize, ParseError> {
        match self.state {
            ParseState::AwaitingRequestLine => {
                let Some((consumed, line)) = parse_request_line(buf)? else {
                    return Ok(0);
                };
                self.request.line = line;
                self.advance(ParseState::AwaitingHeaders);
                Ok(consumed)
            }

            ParseState::AwaitingHeaders => {
                let (consumed, terminated) = self.request.headers.parse(buf)?;
                if terminated {
                    self.advance(ParseState::AwaitingBody);
                }
                Ok(consumed)
            }

            ParseState::AwaitingBody => self.parse_body(buf, eof),

            ParseState::Complete => Ok(0),
        }
    }

    fn parse_body(&mut self, buf: &[u8], eof: bool) -> Result<usize, ParseError> {
        let Some(value) = self.request.headers.get("content-length") else {
            self.advance(ParseState::Complete);
            return Ok(0);
        };

        let expected: usize = value.parse().map_err(|_| ParseError::ContentLength {
            value: value.to_string(),
        })?;

        if !eof {
            return Ok(0);
        }

        if buf.len() != expected {
            return Err(ParseError::BodyLength {
                expected,
                actual: buf.len(),
            });
        }

        self.request.body = buf.to_vec();
        self.advance(ParseState::Complete);
        Ok(buf.len())
    }

    fn advance(&mut self, next: ParseState) {
        debug!(from = ?self.state, to = ?next, "parser state change");
        self.state = next;
    }
}

/// Parses `METHOD SP target SP HTTP/1.1 CRLF`. `Ok(None)` if the line is
/// not fully buffered yet.
fn parse_request_line(buf: &[u8]) -> Result<Option<(usize, RequestLine)>, ParseError> {
    let Some(line_end) = find_crlf(buf) else {
        return Ok(None);
    };

    let parts: Vec<&[u8]> = buf[..line_end].split(|&b| b == b' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::PartsCount { found: parts.len() });
    };

    if method.is_empty() || !method.iter().all(u8::is_ascii_uppercase) {
        return Err(ParseError::MethodFormat {
            method: String::from_utf8_lossy(method).into_owned(),
        });
    }

    if version != SUPPORTED_VERSION.as_bytes() {
        return Err(ParseError::VersionFormat {
            version: String::from_utf8_lossy(version).into_owned(),
        });
    }

    let line = RequestLine {
        method: String::from_utf8_lossy(method).into_owned(),
        target: target.to_vec(),
        version: "1.1".to_string(),
    };

    Ok(Some((line_end + 2, line)))
}

/// Reads one complete request from `reader`.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, RequestError>
where
    R: AsyncRead + Unpin,
{
    read_request_with_capacity(reader, INITIAL_BUFFER_SIZE).await
}

/// Like [`read_request`], starting from a buffer of `capacity` bytes.
pub async fn read_request_with_capacity<R>(
    reader: &mut R,
    capacity: usize,
) -> Result<Request, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestParser::new();
    let mut buf = BytesMut::with_capacity(capacity.max(1));
    let mut eof = false;

    loop {
        // Drain whatever the parser can use before reading again.
        loop {
            let before = parser.state();
            let consumed = parser.feed(&buf, eof)?;
            buf.advance(consumed);

            if parser.is_complete() {
                return Ok(parser.request);
            }
            if consumed == 0 && parser.state() == before {
                break;
            }
        }

        if eof {
            return Err(ParseError::Truncated.into());
        }

        if buf.len() == buf.capacity() {
            let grow_by = buf.capacity().max(1);
            buf.reserve(grow_by);
            debug!(capacity = buf.capacity(), "request buffer grown");
        }

        if reader.read_buf(&mut buf).await? == 0 {
            eof = true;
        }
    }
}
