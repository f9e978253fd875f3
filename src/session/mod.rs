//! Connection handling primitives
//!
//! This module provides:
//! - The [`Stream`] abstraction every handler works on
//! - The full-duplex [`proxy`] used by registered peers

pub mod proxy;
pub mod stream;

pub use proxy::proxy;
pub use stream::{BoxedStream, Stream};
