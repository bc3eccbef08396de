use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::{Instant, Sleep};
use tracing::{debug, error, warn};

use crate::http::error::RequestError;
use crate::http::parser::read_request;
use crate::http::request::Request;
use crate::http::response::write_error_response;
use crate::http::writer::ResponseWriter;

/// Write side handed to handlers. Boxed so one handler type serves any
/// transport.
pub type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Business logic invoked once per connection with the parsed request.
///
/// The handler owns the writer; the connection is closed once the returned
/// future resolves. Implemented for any matching async closure:
///
/// ```ignore
/// let handler = |mut w: ResponseWriter<BoxedWrite>, req: Request| async move {
///     w.write_status_line(StatusCode::OK).await?;
///     // ...
///     Ok::<(), anyhow::Error>(())
/// };
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call(&self, writer: ResponseWriter<BoxedWrite>, request: Request) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(ResponseWriter<BoxedWrite>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, writer: ResponseWriter<BoxedWrite>, request: Request) -> HandlerFuture {
        Box::pin(self(writer, request))
    }
}

/// Reader that fails with `TimedOut` once a fixed deadline has passed.
///
/// The deadline is absolute: it is set once and every later read shares it.
pub struct DeadlineReader<R> {
    inner: R,
    deadline: Pin<Box<Sleep>>,
}

impl<R> DeadlineReader<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self {
            inner,
            deadline: Box::pin(tokio::time::sleep_until(Instant::now() + timeout)),
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for DeadlineReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.deadline.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "read deadline exceeded",
            )));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

/// One accepted client connection.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_timeout: Duration,
    handler: Arc<dyn Handler>,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        read_timeout: Duration,
        handler: Arc<dyn Handler>,
    ) -> Self {
        Self {
            stream,
            peer,
            read_timeout,
            handler,
        }
    }

    /// Serves exactly one request, then closes the connection.
    pub async fn run(self) -> anyhow::Result<()> {
        let (reader, writer) = self.stream.into_split();
        debug!(peer = %self.peer, "serving connection");
        serve(reader, writer, self.read_timeout, self.handler.as_ref()).await
    }
}

/// Drives one request/response cycle over a split stream.
///
/// A malformed request gets a best-effort `500` carrying the error text.
/// I/O failures, the read deadline included, abort without a response.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    read_timeout: Duration,
    handler: &dyn Handler,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let mut reader = DeadlineReader::new(reader, read_timeout);
    let mut writer = ResponseWriter::new(Box::new(writer) as BoxedWrite);

    let request = match read_request(&mut reader).await {
        Ok(request) => request,
        Err(RequestError::Parse(e)) => {
            warn!(error = %e, "rejecting malformed request");
            if let Err(write_err) = write_error_response(&mut writer, &e.to_string()).await {
                debug!(error = %write_err, "failed to send error response");
            }
            if let Err(flush_err) = writer.flush().await {
                debug!(error = %flush_err, "failed to flush error response");
            }
            return Ok(());
        }
        Err(RequestError::Io(e)) => return Err(e.into()),
    };

    debug!(
        method = %request.method(),
        target = %request.target(),
        "request parsed"
    );

    if let Err(e) = handler.call(writer, request).await {
        error!(error = %e, "handler failed");
    }

    Ok(())
}
