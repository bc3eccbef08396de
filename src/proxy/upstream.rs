//! Relaying a remote resource as a chunked response.
//!
//! The upstream is fetched over plain HTTP/1.0 so its body arrives unframed
//! and ends when the upstream closes. Each read is forwarded as one chunk,
//! and the body's SHA-256 and byte count follow as trailers.

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::BytesMut;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::http::headers::Headers;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Largest chunk relayed in one frame.
pub const CHUNK_SIZE: usize = 1024;

/// Upper bound on the upstream response head.
const MAX_HEAD_SIZE: usize = 64 * 1024;

pub const CONTENT_SHA256_TRAILER: &str = "X-Content-Sha256";
pub const CONTENT_LENGTH_TRAILER: &str = "X-Content-Length";

pub struct Passthrough {
    upstream: Url,
    connect_timeout: Duration,
}

impl Passthrough {
    pub fn new(upstream: &str, connect_timeout: Duration) -> Result<Self> {
        let upstream = Url::parse(upstream).context("Invalid upstream URL")?;
        if upstream.scheme() != "http" {
            anyhow::bail!("unsupported upstream scheme {:?}", upstream.scheme());
        }
        upstream.host_str().context("Upstream URL missing host")?;

        Ok(Self {
            upstream,
            connect_timeout,
        })
    }

    fn authority(&self) -> String {
        let host = self.upstream.host_str().unwrap_or_default();
        match self.upstream.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Builds the request sent upstream for `path`.
    pub fn build_request(&self, path: &str) -> Vec<u8> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path,
            self.authority()
        )
        .into_bytes()
    }

    /// Fetches `path` upstream and streams its body into `writer` as a
    /// chunked `200` response. The trailers carry the lowercase hex SHA-256
    /// of the relayed bytes and their count.
    pub async fn relay<W>(&self, path: &str, writer: &mut ResponseWriter<W>) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let addr = format!(
            "{}:{}",
            self.upstream.host_str().unwrap_or_default(),
            self.upstream.port_or_known_default().unwrap_or(80)
        );
        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to upstream")?;

        stream.write_all(&self.build_request(path)).await?;
        tracing::debug!(upstream = %addr, path, "request sent upstream");

        let mut buffer = skip_head(&mut stream).await?;

        writer.write_status_line(StatusCode::OK).await?;
        let headers: Headers = [
            ("content-type", "text/plain"),
            ("connection", "close"),
            ("transfer-encoding", "chunked"),
            ("trailer", "X-Content-Sha256, X-Content-Length"),
        ]
        .into_iter()
        .collect();
        writer.write_headers(&headers).await?;

        let mut hasher = Sha256::new();
        let mut relayed = 0;
        loop {
            while !buffer.is_empty() {
                let chunk = buffer.split_to(buffer.len().min(CHUNK_SIZE));
                writer.write_chunked_body(&chunk).await?;
                hasher.update(&chunk);
                relayed += chunk.len();
            }

            buffer.reserve(CHUNK_SIZE);
            if stream.read_buf(&mut buffer).await? == 0 {
                break;
            }
        }

        writer.write_chunked_body_done(true).await?;
        let trailers: Headers = [
            (CONTENT_SHA256_TRAILER, format!("{:x}", hasher.finalize())),
            (CONTENT_LENGTH_TRAILER, relayed.to_string()),
        ]
        .into_iter()
        .collect();
        writer.write_trailers(&trailers).await?;
        writer.flush().await?;

        Ok(relayed)
    }
}

/// Reads past the upstream status line and headers, returning any body
/// bytes that arrived with them.
async fn skip_head(stream: &mut TcpStream) -> Result<BytesMut> {
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);

    loop {
        if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let _ = buffer.split_to(head_end + 4);
            return Ok(buffer);
        }

        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("Upstream response head too large");
        }

        if stream.read_buf(&mut buffer).await? == 0 {
            anyhow::bail!("Connection closed before complete response head received");
        }
    }
}
