//! Error types
//!
//! Every fallible operation in the crate returns [`Result`]. Failures are
//! scoped to the connection they happened on; nothing here is fatal to the
//! server process.

use bytes::Bytes;

use crate::registry::Hash;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Transport failure (accept, read, write, reset, end-of-stream)
    Io(std::io::Error),
    /// Malformed input on the wire
    Protocol(ProtocolError),
    /// Routing failure
    Dispatch(DispatchError),
    /// Failure reported by a handler's own logic
    Handler(String),
}

/// Wire-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// No newline within `max` bytes; `partial` holds what was read
    LineTooLong { partial: Bytes, max: usize },
    /// Registrar command without exactly two non-empty tokens
    MalformedCommand(String),
    /// Registrar op other than `a`
    UnknownCommand(String),
}

/// Routing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No handler registered for the hash
    HandlerNotFound(Hash),
    /// The peer behind a proxy registration was already consumed
    PeerUnavailable(Hash),
    /// The handler task panicked
    HandlerPanicked(Hash),
}

impl Error {
    /// Create a handler failure from any displayable message
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// True if the error is a line overflow
    pub fn is_line_too_long(&self) -> bool {
        matches!(self, Error::Protocol(ProtocolError::LineTooLong { .. }))
    }

    /// True if no handler was registered for the dispatched hash
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Dispatch(DispatchError::HandlerNotFound(_)))
    }

    /// True if the error is an unexpected end-of-stream
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Dispatch(e) => write!(f, "Dispatch error: {}", e),
            Error::Handler(msg) => write!(f, "Handler error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Dispatch(e) => Some(e),
            Error::Handler(_) => None,
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::LineTooLong { max, .. } => {
                write!(f, "No newline found within {} bytes", max)
            }
            ProtocolError::MalformedCommand(line) => {
                write!(f, "Malformed registrar command: {:?}", line)
            }
            ProtocolError::UnknownCommand(op) => write!(f, "Unknown registrar command: {}", op),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::HandlerNotFound(hash) => write!(f, "Handler not found: {}", hash),
            DispatchError::PeerUnavailable(hash) => {
                write!(f, "Registered peer no longer available: {}", hash)
            }
            DispatchError::HandlerPanicked(hash) => write!(f, "Handler panicked: {}", hash),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        Error::Dispatch(e)
    }
}
