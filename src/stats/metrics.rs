//! Statistics and metrics for the dispatch server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Byte counts for one completed proxy session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyStats {
    /// Bytes copied from the dispatched caller to the registered peer
    pub caller_to_peer: u64,
    /// Bytes copied from the registered peer back to the caller
    pub peer_to_caller: u64,
    /// Wall time of the session
    pub duration: Duration,
}

impl ProxyStats {
    /// Total bytes moved in both directions
    pub fn total_bytes(&self) -> u64 {
        self.caller_to_peer + self.peer_to_caller
    }
}

/// Server-wide counters, updated concurrently by connection tasks
#[derive(Debug, Default)]
pub struct ServerMetrics {
    connections_accepted: AtomicU64,
    connections_active: AtomicU64,
    connections_rejected: AtomicU64,
    dispatched: AtomicU64,
    not_found: AtomicU64,
    handler_failures: AtomicU64,
    registrations: AtomicU64,
    proxied_bytes: AtomicU64,
}

impl ServerMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_proxy(&self, stats: &ProxyStats) {
        self.proxied_bytes
            .fetch_add(stats.total_bytes(), Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> ServerStats {
        ServerStats {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            proxied_bytes: self.proxied_bytes.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of server-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Total connections ever accepted
    pub connections_accepted: u64,
    /// Connections currently being served
    pub connections_active: u64,
    /// Connections dropped because of the connection limit
    pub connections_rejected: u64,
    /// Streams handed to a handler
    pub dispatched: u64,
    /// Streams whose hash had no handler
    pub not_found: u64,
    /// Handler invocations that returned an error or panicked
    pub handler_failures: u64,
    /// Hashes added through the registrar
    pub registrations: u64,
    /// Bytes moved by completed proxy sessions
    pub proxied_bytes: u64,
}
