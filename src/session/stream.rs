//! Connection abstraction
//!
//! Handlers, the registrar and the proxy work on any bidirectional byte
//! stream, not just TCP sockets. In-memory pipes (`tokio::io::duplex`) and
//! test mocks qualify as well.

use tokio::io::{AsyncRead, AsyncWrite};

/// A bidirectional byte stream that can be moved across tasks
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Owned, type-erased connection
///
/// Ownership of a `BoxedStream` is ownership of the connection: dropping it
/// closes the underlying transport.
pub type BoxedStream = Box<dyn Stream>;
