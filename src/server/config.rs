//! Server configuration

use std::net::SocketAddr;

use crate::protocol::constants::{DEFAULT_MAX_LINE_LEN, DEFAULT_PORT, REGISTRAR_HASH};
use crate::registry::Hash;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Byte cap for the hash line and the registrar command line
    pub max_line_len: usize,

    /// Control hash the registrar is bound to (None = no registrar)
    pub registrar_hash: Option<Hash>,

    /// Send `<hash>\n` to a registered peer before proxying a caller to it
    pub announce_hash: bool,

    /// Copy buffer size for each proxy direction
    pub proxy_buffer_size: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: 0, // Unlimited
            max_line_len: DEFAULT_MAX_LINE_LEN,
            registrar_hash: Some(Hash::from_static(REGISTRAR_HASH)),
            announce_hash: false,
            proxy_buffer_size: 8 * 1024, // 8KB
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the line length cap (at least 1)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len.max(1);
        self
    }

    /// Bind the registrar to a different control hash
    pub fn registrar_hash(mut self, hash: impl Into<Hash>) -> Self {
        self.registrar_hash = Some(hash.into());
        self
    }

    /// Run without the built-in registrar
    pub fn disable_registrar(mut self) -> Self {
        self.registrar_hash = None;
        self
    }

    /// Announce the dispatched hash to registered peers
    pub fn announce_hash(mut self, enabled: bool) -> Self {
        self.announce_hash = enabled;
        self
    }

    /// Set the proxy copy buffer size (at least 1)
    pub fn proxy_buffer_size(mut self, size: usize) -> Self {
        self.proxy_buffer_size = size.max(1);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}
