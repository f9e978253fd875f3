//! Built-in handlers
//!
//! Mostly useful for testing a deployment: `EchoContent` reflects the payload
//! and `EchoHash` reflects the dispatch key.

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::registry::Hash;
use crate::session::BoxedStream;

/// Copy everything read back to the sender until end-of-stream
pub(crate) async fn echo_content(stream: BoxedStream) -> Result<()> {
    let (mut rd, mut wr) = tokio::io::split(stream);
    tokio::io::copy(&mut rd, &mut wr).await?;
    wr.shutdown().await?;
    Ok(())
}

/// Write the hash back and finish
pub(crate) async fn echo_hash(hash: &Hash, mut stream: BoxedStream) -> Result<()> {
    stream.write_all(hash.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
