//! Dispatch keys
//!
//! A hash is an opaque routing token. It is never computed or verified here;
//! the only property relied on is that it is unique within one registry.

use bytes::Bytes;

/// Opaque routing key sent as the first line of every stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(Bytes);

impl Hash {
    /// Create a hash from a static string
    pub const fn from_static(s: &'static str) -> Self {
        Hash(Bytes::from_static(s.as_bytes()))
    }

    /// Raw bytes of the hash
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty hash (an empty first line)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cheap clone of the underlying buffer
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<Bytes> for Hash {
    fn from(bytes: Bytes) -> Self {
        Hash(bytes)
    }
}

impl From<Vec<u8>> for Hash {
    fn from(bytes: Vec<u8>) -> Self {
        Hash(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Hash {
    fn from(bytes: &[u8]) -> Self {
        Hash(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Hash {
    fn from(s: &str) -> Self {
        Hash(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Hash {
    fn from(s: String) -> Self {
        Hash(Bytes::from(s))
    }
}

impl From<&Hash> for Hash {
    fn from(hash: &Hash) -> Self {
        hash.clone()
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
