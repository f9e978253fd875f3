//! Full-duplex stream proxy
//!
//! Copies bytes caller→peer and peer→caller concurrently. When one direction
//! sees end-of-stream it shuts down the write half it was feeding, so the far
//! side observes EOF too. The first error in either direction cancels the
//! other. Both streams are shut down and dropped before `proxy` returns, on
//! every exit path.

use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::session::stream::BoxedStream;
use crate::stats::ProxyStats;

/// Proxy between a dispatched caller and a registered peer until both
/// directions finish or either fails.
pub async fn proxy(caller: BoxedStream, peer: BoxedStream, buffer_size: usize) -> Result<ProxyStats> {
    let started = Instant::now();

    let (mut caller_rd, mut caller_wr) = tokio::io::split(caller);
    let (mut peer_rd, mut peer_wr) = tokio::io::split(peer);

    let result = tokio::try_join!(
        pump(&mut caller_rd, &mut peer_wr, buffer_size),
        pump(&mut peer_rd, &mut caller_wr, buffer_size),
    );

    close(caller_rd.unsplit(caller_wr)).await;
    close(peer_rd.unsplit(peer_wr)).await;

    let (caller_to_peer, peer_to_caller) = result?;
    let stats = ProxyStats {
        caller_to_peer,
        peer_to_caller,
        duration: started.elapsed(),
    };

    tracing::debug!(
        caller_to_peer = stats.caller_to_peer,
        peer_to_caller = stats.peer_to_caller,
        duration_ms = stats.duration.as_millis() as u64,
        "Proxy session finished"
    );

    Ok(stats)
}

/// Copy one direction, then propagate EOF to the writer
async fn pump<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::with_capacity(buffer_size, reader);
    let copied = tokio::io::copy_buf(&mut reader, writer).await?;
    writer.shutdown().await?;
    Ok(copied)
}

async fn close(mut stream: BoxedStream) {
    // The write half may already be shut down by `pump`
    if let Err(e) = stream.shutdown().await {
        tracing::trace!(error = %e, "Shutdown on close failed");
    }
}
