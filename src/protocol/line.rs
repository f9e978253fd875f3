//! Bounded line reader
//!
//! Reads the dispatch hash and registrar commands off a raw byte stream.
//! The reader pulls one byte at a time so that nothing past the newline is
//! consumed: whatever follows belongs to the handler that gets the stream.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::NEWLINE;

/// Read one newline-terminated line of at most `max` bytes.
///
/// Returns the bytes before the newline; the newline itself is discarded.
/// If `max` bytes arrive without a newline, fails with
/// [`ProtocolError::LineTooLong`] carrying the partial buffer. End-of-stream
/// surfaces as an `UnexpectedEof` I/O error.
///
/// No timeout is applied. Callers that need a bounded wait should wrap the
/// call in `tokio::time::timeout`.
pub async fn read_line<R>(stream: &mut R, max: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::with_capacity(max.min(256));

    while buf.len() < max {
        let byte = stream.read_u8().await?;
        if byte == NEWLINE {
            return Ok(buf.freeze());
        }
        buf.put_u8(byte);
    }

    Err(ProtocolError::LineTooLong {
        partial: buf.freeze(),
        max,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_read_line_exact() {
        let mut mock = Builder::new().read(b"somehash\n").build();

        let line = read_line(&mut mock, 1024).await.unwrap();
        assert_eq!(&line[..], b"somehash");
    }

    #[tokio::test]
    async fn test_read_line_leaves_remainder() {
        let mut input: &[u8] = b"somehash\nfirst line\nsecond line\n";

        let line = read_line(&mut input, 1024).await.unwrap();
        assert_eq!(&line[..], b"somehash");
        assert_eq!(input, b"first line\nsecond line\n");
    }

    #[tokio::test]
    async fn test_read_line_split_reads() {
        let mut mock = Builder::new().read(b"some").read(b"ha").read(b"sh\n").build();

        let line = read_line(&mut mock, 1024).await.unwrap();
        assert_eq!(&line[..], b"somehash");
    }

    #[tokio::test]
    async fn test_read_line_empty() {
        let mut input: &[u8] = b"\nrest";

        let line = read_line(&mut input, 1024).await.unwrap();
        assert!(line.is_empty());
        assert_eq!(input, b"rest");
    }

    #[tokio::test]
    async fn test_read_line_just_under_max() {
        let mut data = vec![b'x'; 9];
        data.push(b'\n');
        let mut input: &[u8] = &data;

        let line = read_line(&mut input, 10).await.unwrap();
        assert_eq!(line.len(), 9);
    }

    #[tokio::test]
    async fn test_read_line_too_long() {
        let data = vec![b'x'; 20];
        let mut input: &[u8] = &data;

        let err = read_line(&mut input, 10).await.unwrap_err();
        match err {
            Error::Protocol(ProtocolError::LineTooLong { partial, max }) => {
                assert_eq!(max, 10);
                assert_eq!(&partial[..], &[b'x'; 10][..]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Only `max` bytes were consumed
        assert_eq!(input.len(), 10);
    }

    #[tokio::test]
    async fn test_read_line_newline_at_max_is_too_long() {
        let mut data = vec![b'x'; 10];
        data.push(b'\n');
        let mut input: &[u8] = &data;

        let err = read_line(&mut input, 10).await.unwrap_err();
        assert!(err.is_line_too_long());
    }

    #[tokio::test]
    async fn test_read_line_eof() {
        let mut mock = Builder::new().read(b"abc").build();

        let err = read_line(&mut mock, 1024).await.unwrap_err();
        assert!(err.is_eof());
    }

    #[tokio::test]
    async fn test_read_line_propagates_io_error() {
        let mut mock = Builder::new()
            .read(b"ab")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        let err = read_line(&mut mock, 1024).await.unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other}"),
        }
    }
}
