//! Registrar sub-commands
//!
//! A connection dispatched to the control hash sends one more line:
//!
//! ```text
//! a <subhash>\n
//! ```
//!
//! Only `a` (add) is defined.

use bytes::Bytes;

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::{COMMAND_SEPARATOR, OP_ADD};
use crate::registry::Hash;

/// A parsed registrar command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarCommand {
    /// Route future streams for this hash to the registering connection
    Add(Hash),
}

impl RegistrarCommand {
    /// Parse a command line (newline already stripped)
    pub fn parse(line: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(line);
        let mut parts = text.split(COMMAND_SEPARATOR);

        let (op, arg) = match (parts.next(), parts.next(), parts.next()) {
            (Some(op), Some(arg), None) if !op.is_empty() && !arg.is_empty() => (op, arg),
            _ => return Err(ProtocolError::MalformedCommand(text.into_owned()).into()),
        };

        match op {
            OP_ADD => Ok(RegistrarCommand::Add(Hash::from(arg))),
            other => Err(ProtocolError::UnknownCommand(other.to_string()).into()),
        }
    }

    /// Encode as a wire line, newline included
    pub fn to_line(&self) -> Bytes {
        match self {
            RegistrarCommand::Add(hash) => {
                let mut line = Vec::with_capacity(OP_ADD.len() + hash.len() + 2);
                line.extend_from_slice(OP_ADD.as_bytes());
                line.push(COMMAND_SEPARATOR as u8);
                line.extend_from_slice(hash.as_bytes());
                line.push(b'\n');
                Bytes::from(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_add() {
        let cmd = RegistrarCommand::parse(b"a sha256:cdcae2a1").unwrap();
        assert_eq!(cmd, RegistrarCommand::Add(Hash::from("sha256:cdcae2a1")));
    }

    #[test]
    fn test_parse_unknown_op() {
        let err = RegistrarCommand::parse(b"d sha256:cdcae2a1").unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnknownCommand(ref op)) if op == "d"
        ));
    }

    #[test]
    fn test_parse_wrong_token_count() {
        let lines: [&[u8]; 5] = [b"a", b"a x y", b"", b"a ", b" x"];
        for line in lines {
            let err = RegistrarCommand::parse(line).unwrap_err();
            assert!(
                matches!(err, Error::Protocol(ProtocolError::MalformedCommand(_))),
                "line {:?} gave {}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_to_line() {
        let cmd = RegistrarCommand::Add(Hash::from("callback"));
        assert_eq!(&cmd.to_line()[..], b"a callback\n");
    }
}
