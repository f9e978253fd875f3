//! Dispatch server listener
//!
//! Handles the TCP accept loop and spawns one task per connection.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::{Handler, HandlerRegistry, Hash, Registration};
use crate::server::config::ServerConfig;
use crate::server::dispatch::Dispatcher;
use crate::stats::{ServerMetrics, ServerStats};

/// Content-addressed dispatch server
///
/// Owns the handler registry. If the config names a registrar hash, the
/// built-in registrar is bound to it at construction.
pub struct DispatchServer {
    config: Arc<ServerConfig>,
    registry: Arc<HandlerRegistry>,
    metrics: Arc<ServerMetrics>,
    next_conn_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl DispatchServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let registry = match config.registrar_hash {
            Some(ref hash) => HandlerRegistry::with_handlers([(hash.clone(), Handler::Registrar)]),
            None => HandlerRegistry::new(),
        };

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            metrics: Arc::new(ServerMetrics::new()),
            next_conn_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Bind `handler` to `hash`, replacing any previous binding
    pub async fn register(&self, hash: impl Into<Hash>, handler: Handler) -> bool {
        self.registry.register(hash, handler).await
    }

    /// Handler currently bound to `hash`
    pub async fn lookup(&self, hash: &Hash) -> Option<Handler> {
        self.registry.lookup(hash).await
    }

    /// Snapshot of all bindings, in no particular order
    pub async fn registrations(&self) -> Vec<Registration> {
        self.registry.registrations().await
    }

    /// Get a reference to the handler registry
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Current server statistics
    pub fn stats(&self) -> ServerStats {
        self.metrics.snapshot()
    }

    /// A dispatcher sharing this server's registry, for streams that do not
    /// come from the listener
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
            Arc::clone(&self.metrics),
        )
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// Only returns if binding the listener fails.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener, forever
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        log_listening(&listener);
        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// Stops accepting once `shutdown` resolves. Connections already being
    /// served run to completion on their own tasks.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        log_listening(&listener);

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.metrics.connection_rejected();
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(conn_id = conn_id, peer = %peer_addr, "New connection");

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(conn_id = conn_id, error = %e, "Failed to configure socket");
            return;
        }

        let dispatcher = self.dispatcher();
        let metrics = Arc::clone(&self.metrics);
        metrics.connection_opened();

        tokio::spawn(async move {
            let _permit = permit;

            match dispatcher.dispatch(socket).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(conn_id = conn_id, peer = %peer_addr, error = %e, "Dropping connection");
                }
                Err(e) => {
                    tracing::debug!(conn_id = conn_id, peer = %peer_addr, error = %e, "Connection error");
                }
            }

            metrics.connection_closed();
            tracing::debug!(conn_id = conn_id, "Connection task finished");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}

fn log_listening(listener: &TcpListener) {
    match listener.local_addr() {
        Ok(addr) => tracing::info!(addr = %addr, "Dispatch server listening"),
        Err(e) => tracing::warn!(error = %e, "Dispatch server listening on unknown address"),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::protocol::REGISTRAR_HASH;

    async fn spawn_server(config: ServerConfig) -> (Arc<DispatchServer>, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(DispatchServer::new(config));

        let running = Arc::clone(&server);
        tokio::spawn(async move { running.serve(listener).await });

        (server, addr)
    }

    #[tokio::test]
    async fn test_new_binds_registrar() {
        let server = DispatchServer::new(ServerConfig::default());

        let handler = server.lookup(&Hash::from(REGISTRAR_HASH)).await;
        assert!(matches!(handler, Some(Handler::Registrar)));
        assert_eq!(server.registrations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_new_without_registrar() {
        let server = DispatchServer::new(ServerConfig::default().disable_registrar());
        assert!(server.registrations().await.is_empty());
    }

    #[tokio::test]
    async fn test_serve_echo() {
        let (server, addr) = spawn_server(ServerConfig::default()).await;
        server.register("somehash", Handler::EchoContent).await;

        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"somehash\nfirst line\nsecond line\n")
            .await
            .unwrap();
        conn.shutdown().await.unwrap();

        let mut got = Vec::new();
        conn.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, b"first line\nsecond line\n");
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let (server, addr) = spawn_server(ServerConfig::default().max_connections(1)).await;
        server.register("somehash", Handler::EchoContent).await;

        // First connection holds the only permit while its handler runs
        let mut first = TcpStream::connect(addr).await.unwrap();
        first.write_all(b"somehash\n").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // Second is accepted by the OS and then dropped by the server
        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut buf = Vec::new();
        let n = second.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
        assert_eq!(server.stats().connections_rejected, 1);

        first.write_all(b"still here\n").await.unwrap();
        let mut echoed = [0u8; 11];
        first.read_exact(&mut echoed).await.unwrap();
        assert_eq!(&echoed, b"still here\n");
    }
}
