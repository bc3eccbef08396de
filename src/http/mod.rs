//! HTTP/1.1 over a raw byte stream.
//!
//! # Architecture
//!
//! - **`headers`**: header-line parser and case-insensitive header table
//! - **`request`**: the parsed request
//! - **`parser`**: incremental request parser and the read loop driving it
//! - **`response`**: status codes and the canned error response
//! - **`writer`**: order-enforcing response serializer, chunked bodies included
//! - **`connection`**: per-connection worker and the `Handler` trait
//! - **`error`**: parse and write error types
//!
//! # Request parsing
//!
//! ```text
//!   AwaitingRequestLine ──► AwaitingHeaders ──► AwaitingBody ──► Complete
//!                            ▲          │
//!                            └──────────┘ one header line per feed
//! ```
//!
//! # Response writing
//!
//! ```text
//!   Init ──► StatusLineWritten ──► HeadersWritten ──► BodyWritten ──► (trailers)
//!                                    │  ▲                 ▲
//!                                    └──┘ chunks          │
//!                                    chunked_body_done ───┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use httpwire::http::connection::BoxedWrite;
//! use httpwire::http::headers::Headers;
//! use httpwire::http::request::Request;
//! use httpwire::http::response::StatusCode;
//! use httpwire::http::writer::ResponseWriter;
//! use httpwire::server::Server;
//!
//! let handler = |mut w: ResponseWriter<BoxedWrite>, req: Request| async move {
//!     let body = req.target_bytes().to_vec();
//!     let mut headers = Headers::new();
//!     headers.set_defaults(body.len(), &[]);
//!     w.write_status_line(StatusCode::OK).await?;
//!     w.write_headers(&headers).await?;
//!     w.write_body(&body).await?;
//!     Ok::<(), anyhow::Error>(())
//! };
//! let server = Server::bind(&cfg.server, handler).await?;
//! ```

pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub(crate) const CRLF: &[u8] = b"\r\n";
