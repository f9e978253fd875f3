//! Registrar handler
//!
//! Bound to the control hash. A peer that connects with
//!
//! ```text
//! <control-hash>\n
//! a <subhash>\n
//! ```
//!
//! hands its connection over to the registry: `<subhash>` is bound to a
//! [`Handler::Proxy`] that owns the connection, and the next caller
//! dispatched under `<subhash>` is proxied to it. Nothing is written back to
//! the registering peer. Its connection stays open, waiting for a caller.

use crate::error::Result;
use crate::protocol::{read_line, RegistrarCommand};
use crate::registry::{Handler, PeerSlot};
use crate::server::dispatch::Dispatcher;
use crate::session::BoxedStream;

/// Read one registrar command from `peer` and apply it
///
/// Unknown or malformed commands are logged and ignored; the connection is
/// then dropped. Only a failure to read the command line is an error.
pub(crate) async fn handle(dispatcher: &Dispatcher, mut peer: BoxedStream) -> Result<()> {
    let line = read_line(&mut peer, dispatcher.config().max_line_len).await?;

    match RegistrarCommand::parse(&line) {
        Ok(RegistrarCommand::Add(subhash)) => {
            let replaced = dispatcher
                .registry()
                .register(subhash.clone(), Handler::Proxy(PeerSlot::new(peer)))
                .await;
            dispatcher.metrics().record_registration();

            tracing::info!(hash = %subhash, replaced = replaced, "Peer registered");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring registrar command");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::registry::{Hash, HandlerRegistry};
    use crate::server::ServerConfig;
    use crate::stats::ServerMetrics;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(HandlerRegistry::new()),
            Arc::new(ServerConfig::default()),
            Arc::new(ServerMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_add_registers_proxy() {
        let dispatcher = dispatcher();
        let (local, mut remote) = tokio::io::duplex(256);
        remote.write_all(b"a callback\n").await.unwrap();

        handle(&dispatcher, Box::new(local)).await.unwrap();

        let handler = dispatcher.registry().lookup(&Hash::from("callback")).await;
        match handler {
            Some(Handler::Proxy(slot)) => assert!(slot.is_available().await),
            other => panic!("unexpected handler {:?}", other),
        }
        assert_eq!(dispatcher.metrics().snapshot().registrations, 1);

        // The registrant's connection is held open, not answered
        let mut buf = [0u8; 1];
        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(50), remote.read(&mut buf)).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_unknown_command_ignored() {
        let dispatcher = dispatcher();
        let (local, mut remote) = tokio::io::duplex(256);
        remote.write_all(b"x callback\n").await.unwrap();

        handle(&dispatcher, Box::new(local)).await.unwrap();

        assert!(dispatcher.registry().is_empty().await);
        // Ignored connections are dropped
        let mut rest = Vec::new();
        assert_eq!(remote.read_to_end(&mut rest).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_command_ignored() {
        let dispatcher = dispatcher();
        let (local, mut remote) = tokio::io::duplex(256);
        remote.write_all(b"a one two\n").await.unwrap();

        handle(&dispatcher, Box::new(local)).await.unwrap();
        assert!(dispatcher.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_command_too_long() {
        let dispatcher = dispatcher();
        let (local, mut remote) = tokio::io::duplex(4096);
        remote.write_all(&[b'a'; 2000]).await.unwrap();

        let err = handle(&dispatcher, Box::new(local)).await.unwrap_err();
        assert!(err.is_line_too_long());
    }

    #[tokio::test]
    async fn test_reregister_replaces_peer() {
        let dispatcher = dispatcher();

        let (first, mut first_remote) = tokio::io::duplex(256);
        first_remote.write_all(b"a callback\n").await.unwrap();
        handle(&dispatcher, Box::new(first)).await.unwrap();

        let (second, mut second_remote) = tokio::io::duplex(256);
        second_remote.write_all(b"a callback\n").await.unwrap();
        handle(&dispatcher, Box::new(second)).await.unwrap();

        assert_eq!(dispatcher.registry().len().await, 1);
        // The replaced registration released its peer connection
        let mut rest = Vec::new();
        assert_eq!(first_remote.read_to_end(&mut rest).await.unwrap(), 0);
    }
}
