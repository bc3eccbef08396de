use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http::connection::{Connection, Handler};

/// A running server. Dropping it closes the listening socket.
pub struct Server {
    open: Arc<AtomicBool>,
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl Server {
    /// Binds the configured address and starts accepting connections.
    pub async fn bind(cfg: &ServerConfig, handler: impl Handler) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
        Self::serve(listener, cfg.read_timeout(), handler)
    }

    /// Starts accepting on an already bound listener.
    pub fn serve(
        listener: TcpListener,
        read_timeout: Duration,
        handler: impl Handler,
    ) -> anyhow::Result<Self> {
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let open = Arc::new(AtomicBool::new(true));
        let handler: Arc<dyn Handler> = Arc::new(handler);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&open),
            read_timeout,
            handler,
        ));

        Ok(Self {
            open,
            local_addr,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Stops accepting and closes the listening socket. Connections already
    /// being served run to completion.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.accept_task.abort();
            info!("Server closed");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.close();
    }
}

async fn accept_loop(
    listener: TcpListener,
    open: Arc<AtomicBool>,
    read_timeout: Duration,
    handler: Arc<dyn Handler>,
) {
    while open.load(Ordering::SeqCst) {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "accept failed, no longer accepting connections");
                return;
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let conn = Connection::new(socket, peer, read_timeout, handler);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {}", peer, e);
            }
            info!("Connection from {} closed", peer);
        });
    }
}
