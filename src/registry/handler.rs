//! Handler variants
//!
//! A handler takes ownership of a dispatched stream and does all further I/O
//! on it. Handlers are a tagged enum rather than bare closures so that a
//! registration which owns a peer connection is visible in the type.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::key::Hash;
use crate::error::Result;
use crate::session::BoxedStream;

/// Boxed future returned by [`StreamHandler`]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// User-supplied handler logic
///
/// Implemented for any `Fn(Hash, BoxedStream) -> impl Future<Output = Result<()>>`.
pub trait StreamHandler: Send + Sync + 'static {
    /// Handle the remainder of a stream dispatched under `hash`
    fn handle(&self, hash: Hash, stream: BoxedStream) -> BoxFuture<'static, Result<()>>;
}

impl<F, Fut> StreamHandler for F
where
    F: Fn(Hash, BoxedStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn handle(&self, hash: Hash, stream: BoxedStream) -> BoxFuture<'static, Result<()>> {
        Box::pin((self)(hash, stream))
    }
}

/// A registered handler
#[derive(Clone)]
pub enum Handler {
    /// Write every byte read back to the sender
    EchoContent,
    /// Write the dispatch hash back, then finish
    EchoHash,
    /// Built-in registrar bound to the control hash
    Registrar,
    /// Proxy callers to a previously registered peer connection
    Proxy(PeerSlot),
    /// Arbitrary user logic
    Custom(Arc<dyn StreamHandler>),
}

impl Handler {
    /// Wrap an async closure taking `(hash, stream)`
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Hash, BoxedStream) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Handler::Custom(Arc::new(f))
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::EchoContent => "echo-content",
            Handler::EchoHash => "echo-hash",
            Handler::Registrar => "registrar",
            Handler::Proxy(_) => "proxy",
            Handler::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::EchoContent => f.write_str("EchoContent"),
            Handler::EchoHash => f.write_str("EchoHash"),
            Handler::Registrar => f.write_str("Registrar"),
            Handler::Proxy(slot) => f.debug_tuple("Proxy").field(slot).finish(),
            Handler::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Long-lived reference to a registrant's connection
///
/// The registrar moves the registering peer's stream in here; the stream
/// stays open until a caller is proxied to it. A peer serves exactly one
/// proxy session: the first caller takes it and later callers find the slot
/// empty.
#[derive(Clone)]
pub struct PeerSlot {
    peer: Arc<Mutex<Option<BoxedStream>>>,
    registered_at: Instant,
}

impl PeerSlot {
    /// Hold `stream` until a caller claims it
    pub fn new(stream: BoxedStream) -> Self {
        Self {
            peer: Arc::new(Mutex::new(Some(stream))),
            registered_at: Instant::now(),
        }
    }

    /// Claim the peer connection, leaving the slot empty
    pub async fn take(&self) -> Option<BoxedStream> {
        self.peer.lock().await.take()
    }

    /// True while no caller has claimed the peer
    pub async fn is_available(&self) -> bool {
        self.peer.lock().await.is_some()
    }

    /// Time since the peer registered
    pub fn age(&self) -> Duration {
        self.registered_at.elapsed()
    }
}

impl fmt::Debug for PeerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerSlot")
            .field("age", &self.age())
            .finish_non_exhaustive()
    }
}
