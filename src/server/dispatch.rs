//! Per-connection dispatch
//!
//! ```text
//! <hash>\n            read_line (max_line_len)
//!    │
//!    ▼
//! registry.lookup(hash) ──None──► HandlerNotFound, stream dropped
//!    │
//!    ▼
//! handler(hash, stream)  owns the stream from here on
//! ```
//!
//! Nothing is written back to the peer when the hash is unknown, so a client
//! cannot probe which hashes are bound.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use crate::error::{DispatchError, Error, Result};
use crate::protocol::read_line;
use crate::registry::{Handler, HandlerRegistry, Hash, PeerSlot};
use crate::server::config::ServerConfig;
use crate::server::{builtin, registrar};
use crate::session::{proxy, BoxedStream, Stream};
use crate::stats::ServerMetrics;

/// Routes one stream at a time to its handler
///
/// Cheap to clone; every accepted connection gets its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    config: Arc<ServerConfig>,
    metrics: Arc<ServerMetrics>,
}

impl Dispatcher {
    /// Create a dispatcher over a shared registry
    pub fn new(
        registry: Arc<HandlerRegistry>,
        config: Arc<ServerConfig>,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            registry,
            config,
            metrics,
        }
    }

    /// The shared registry
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Server-wide counters
    pub fn metrics(&self) -> &Arc<ServerMetrics> {
        &self.metrics
    }

    /// Read the leading hash from `stream` and hand the rest to its handler
    ///
    /// Returns once the handler finishes. The handler runs in its own task:
    /// if it panics, the stream is dropped during unwinding and the panic is
    /// reported as [`DispatchError::HandlerPanicked`].
    pub async fn dispatch<S: Stream>(&self, stream: S) -> Result<()> {
        let mut stream: BoxedStream = Box::new(stream);

        let hash = Hash::from(read_line(&mut stream, self.config.max_line_len).await?);

        let Some(handler) = self.registry.lookup(&hash).await else {
            self.metrics.record_not_found();
            drop(stream);
            return Err(DispatchError::HandlerNotFound(hash).into());
        };

        self.metrics.record_dispatch();
        let kind = handler.kind();
        tracing::debug!(hash = %hash, handler = kind, "Dispatching stream");

        let task = tokio::spawn(self.clone().invoke(handler, hash.clone(), stream));
        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(DispatchError::HandlerPanicked(hash.clone()).into()),
            Err(e) => Err(Error::handler(e.to_string())),
        };

        if let Err(ref e) = result {
            self.metrics.record_handler_failure();
            tracing::error!(hash = %hash, handler = kind, error = %e, "Handler failed");
        }

        result
    }

    async fn invoke(self, handler: Handler, hash: Hash, stream: BoxedStream) -> Result<()> {
        match handler {
            Handler::EchoContent => builtin::echo_content(stream).await,
            Handler::EchoHash => builtin::echo_hash(&hash, stream).await,
            Handler::Registrar => registrar::handle(&self, stream).await,
            Handler::Proxy(slot) => self.proxy_to_peer(slot, hash, stream).await,
            Handler::Custom(handler) => handler.handle(hash, stream).await,
        }
    }

    async fn proxy_to_peer(&self, slot: PeerSlot, hash: Hash, caller: BoxedStream) -> Result<()> {
        let mut peer = slot
            .take()
            .await
            .ok_or_else(|| DispatchError::PeerUnavailable(hash.clone()))?;

        if self.config.announce_hash {
            peer.write_all(hash.as_bytes()).await?;
            peer.write_all(b"\n").await?;
        }

        let stats = proxy(caller, peer, self.config.proxy_buffer_size).await?;
        self.metrics.record_proxy(&stats);

        Ok(())
    }
}
