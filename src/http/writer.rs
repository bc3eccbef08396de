use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::WriteError;
use crate::http::headers::Headers;
use crate::http::response::StatusCode;
use crate::http::CRLF;

const HTTP_VERSION: &str = "HTTP/1.1";

/// How far a response has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Init,
    StatusLineWritten,
    HeadersWritten,
    BodyWritten,
}

fn serialize_fields(buf: &mut Vec<u8>, headers: &Headers) {
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(CRLF);
    }
    buf.extend_from_slice(CRLF);
}

/// Serializes one response onto `inner`, enforcing write order.
///
/// A call made out of order fails with [`WriteError::Order`] before anything
/// reaches the stream. Each call issues a single `write_all`.
pub struct ResponseWriter<W> {
    inner: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: WriterState::Init,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect(WriterState::Init)?;

        let line = match status.reason_phrase() {
            Some(reason) => format!("{} {} {}\r\n", HTTP_VERSION, status.as_u16(), reason),
            None => format!("{} {}\r\n", HTTP_VERSION, status.as_u16()),
        };
        self.inner.write_all(line.as_bytes()).await?;

        self.state = WriterState::StatusLineWritten;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect(WriterState::StatusLineWritten)?;

        let mut buf = Vec::new();
        serialize_fields(&mut buf, headers);
        self.inner.write_all(&buf).await?;

        self.state = WriterState::HeadersWritten;
        Ok(())
    }

    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterState::HeadersWritten)?;

        self.inner.write_all(body).await?;
        self.state = WriterState::BodyWritten;
        Ok(body.len())
    }

    /// Writes one chunk. Can be repeated; the state stays `HeadersWritten`.
    ///
    /// Returns the number of bytes put on the wire, framing included.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterState::HeadersWritten)?;
        if data.is_empty() {
            return Err(WriteError::EmptyChunk);
        }

        let mut buf = format!("{:x}\r\n", data.len()).into_bytes();
        buf.extend_from_slice(data);
        buf.extend_from_slice(CRLF);
        self.inner.write_all(&buf).await?;

        Ok(buf.len())
    }

    /// Writes the zero-size chunk. Allowed from any state.
    ///
    /// With `has_trailers` the final blank line is left to
    /// [`write_trailers`](Self::write_trailers).
    pub async fn write_chunked_body_done(&mut self, has_trailers: bool) -> Result<usize, WriteError> {
        self.state = WriterState::BodyWritten;

        let frame: &[u8] = if has_trailers { b"0\r\n" } else { b"0\r\n\r\n" };
        self.inner.write_all(frame).await?;
        Ok(frame.len())
    }

    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect(WriterState::BodyWritten)?;

        let mut buf = Vec::new();
        serialize_fields(&mut buf, trailers);
        self.inner.write_all(&buf).await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.inner.flush().await?;
        Ok(())
    }

    fn expect(&self, expected: WriterState) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::Order {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}
