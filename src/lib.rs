//! # pup-rs
//!
//! A content-addressed stream dispatcher. Every TCP connection starts with a
//! hash line; the server looks the hash up in its registry and hands the rest
//! of the stream to the bound handler.
//!
//! ```text
//! <hash>\n
//! <payload bytes, format defined by the selected handler>
//! ```
//!
//! A built-in registrar, bound to a well-known control hash, lets a peer
//! register a second hash for its own connection. A later caller that
//! connects with that hash is proxied, full duplex, to the waiting peer.
//!
//! ```text
//!  peer ── <control>\n a <subhash>\n ──► [registrar] ── registry[subhash] = Proxy(peer)
//!
//!  caller ── <subhash>\n <data> ──► [dispatch] ──► proxy(caller, peer)
//! ```
//!
//! Hashes are opaque routing keys: they are never computed or checked
//! against the payload.
//!
//! # Example
//!
//! ```no_run
//! use pup_rs::{DispatchServer, Handler, ServerConfig};
//!
//! # async fn example() -> pup_rs::Result<()> {
//! let server = DispatchServer::new(ServerConfig::default());
//! server.register("echo", Handler::EchoContent).await;
//! server.run().await
//! # }
//! ```

pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{DispatchError, Error, ProtocolError, Result};
pub use protocol::{read_line, RegistrarCommand, REGISTRAR_HASH};
pub use registry::{Handler, HandlerRegistry, Hash, PeerSlot, Registration, StreamHandler};
pub use server::{DispatchServer, Dispatcher, ServerConfig};
pub use session::{proxy, BoxedStream, Stream};
pub use stats::{ProxyStats, ServerStats};
