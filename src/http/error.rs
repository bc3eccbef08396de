//! Error types for the HTTP layer.
//!
//! Parsing and writing have separate error enums: a [`ParseError`] is a
//! malformed request coming from the peer, while a [`WriteError::Order`] is
//! a handler calling the [`ResponseWriter`](crate::http::writer::ResponseWriter)
//! out of sequence.

use crate::http::writer::WriterState;

/// A malformed request. Fatal for the request it was found in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("wrong parts in request line: expected 3, found {found}")]
    PartsCount { found: usize },

    #[error("wrong method format: {method:?}")]
    MethodFormat { method: String },

    #[error("wrong version format: expected \"HTTP/1.1\", found {version:?}")]
    VersionFormat { version: String },

    #[error("wrong header format at byte {offset}")]
    HeaderFormat { offset: usize },

    #[error("invalid header name: {name:?}")]
    InvalidHeaderName { name: String },

    #[error("invalid content-length: {value:?}")]
    ContentLength { value: String },

    #[error("wrong body length: expected {expected}, found {actual}")]
    BodyLength { expected: usize, actual: usize },

    #[error("input ended before the request was complete")]
    Truncated,
}

/// Failure to read a request off a stream.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to write part of a response.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("wrong write order: expected state {expected:?}, writer is in {actual:?}")]
    Order {
        expected: WriterState,
        actual: WriterState,
    },

    #[error("empty chunk; use write_chunked_body_done to end the body")]
    EmptyChunk,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
