//! Tests for the read loop that drives the request parser

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use httpwire::http::error::{ParseError, RequestError};
use httpwire::http::parser::{read_request, read_request_with_capacity};
use tokio::io::{AsyncRead, ReadBuf};

/// Hands out at most `step` bytes per read, then reports end of stream.
struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl ChunkReader {
    fn new(data: &[u8], step: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            step,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let end = (self.pos + self.step)
            .min(self.data.len())
            .min(self.pos + buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..end]);
        self.pos = end;
        Poll::Ready(Ok(()))
    }
}

/// Yields its bytes, then fails instead of reporting end of stream.
struct FailingReader {
    data: Option<Vec<u8>>,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.data.take() {
            Some(data) => {
                buf.put_slice(&data);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))),
        }
    }
}

const GET: &[u8] = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
const POST: &[u8] = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";

#[tokio::test]
async fn test_get_across_any_fragmentation() {
    for step in 1..=GET.len() {
        let mut reader = ChunkReader::new(GET, step);
        let req = read_request(&mut reader).await.unwrap();

        assert_eq!(req.method(), "GET", "step {}", step);
        assert_eq!(req.target(), "/coffee", "step {}", step);
        assert_eq!(req.header("host"), Some("localhost:42069"), "step {}", step);
        assert_eq!(req.headers.len(), 3, "step {}", step);
    }
}

#[tokio::test]
async fn test_post_body_across_fragmentation() {
    for step in [1, 3, 7, 16, POST.len()] {
        let mut reader = ChunkReader::new(POST, step);
        let req = read_request(&mut reader).await.unwrap();

        assert_eq!(req.body, b"hello world!\n", "step {}", step);
        assert_eq!(req.content_length(), Some(13));
    }
}

#[tokio::test]
async fn test_buffer_grows_for_long_lines() {
    let long_value = "x".repeat(5000);
    let raw = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", long_value);

    let mut reader = ChunkReader::new(raw.as_bytes(), 3);
    let req = read_request_with_capacity(&mut reader, 8).await.unwrap();

    assert_eq!(req.header("x-long"), Some(long_value.as_str()));
}

#[tokio::test]
async fn test_body_length_mismatch_at_end_of_stream() {
    let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhell";
    let mut reader = ChunkReader::new(raw, 4);

    let err = read_request(&mut reader).await.unwrap_err();
    assert!(matches!(
        err,
        RequestError::Parse(ParseError::BodyLength {
            expected: 5,
            actual: 4
        })
    ));
}

#[tokio::test]
async fn test_truncated_headers() {
    let mut reader = ChunkReader::new(b"GET / HTTP/1.1\r\nHost: local", 5);

    let err = read_request(&mut reader).await.unwrap_err();
    assert!(matches!(err, RequestError::Parse(ParseError::Truncated)));
}

#[tokio::test]
async fn test_empty_input() {
    let mut reader = ChunkReader::new(b"", 1);

    let err = read_request(&mut reader).await.unwrap_err();
    assert!(matches!(err, RequestError::Parse(ParseError::Truncated)));
}

#[tokio::test]
async fn test_parse_error_stops_reading() {
    let mut reader = FailingReader {
        data: Some(b"GET / HTTP/1.0\r\n".to_vec()),
    };

    let err = read_request(&mut reader).await.unwrap_err();
    assert!(matches!(
        err,
        RequestError::Parse(ParseError::VersionFormat { .. })
    ));
}

#[tokio::test]
async fn test_read_error_propagates() {
    let mut reader = FailingReader {
        data: Some(b"GET / HTTP/1.1\r\n".to_vec()),
    };

    let err = read_request(&mut reader).await.unwrap_err();
    match err {
        RequestError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected I/O error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_completes_without_end_of_stream() {
    // Reader that would fail if the loop asked it for more after the request.
    let mut reader = FailingReader {
        data: Some(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n".to_vec()),
    };

    let req = read_request(&mut reader).await.unwrap();
    assert_eq!(req.header("host"), Some("a"));
}
