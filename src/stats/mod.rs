//! Server and proxy statistics

pub mod metrics;

pub use metrics::{ProxyStats, ServerMetrics, ServerStats};
