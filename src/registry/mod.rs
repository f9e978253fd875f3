//! Handler registry for hash-based dispatch
//!
//! The registry maps each [`Hash`] to the [`Handler`] that takes over streams
//! whose first line is that hash.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<HandlerRegistry>
//!                   ┌───────────────────────────┐
//!                   │ handlers: HashMap<Hash,   │
//!                   │   Handler {               │
//!                   │     EchoContent,          │
//!                   │     Registrar,            │
//!                   │     Proxy(PeerSlot),      │
//!                   │     Custom(..),           │
//!                   │   }                       │
//!                   │ >                         │
//!                   └─────────────┬─────────────┘
//!                                 │
//!          ┌──────────────────────┼──────────────────────┐
//!          │                      │                      │
//!          ▼                      ▼                      ▼
//!     [Registrar]             [Caller]               [Caller]
//!     register(subhash,       lookup(hash)           lookup(subhash)
//!       Proxy(peer))              │                      │
//!                                 ▼                      ▼
//!                            handler(stream)     proxy(stream, peer)
//! ```
//!
//! Entries are never removed. A peer connection held in a [`PeerSlot`]
//! serves a single proxy session.

pub mod handler;
pub mod key;
pub mod store;

pub use handler::{BoxFuture, Handler, PeerSlot, StreamHandler};
pub use key::Hash;
pub use store::{HandlerRegistry, Registration};
