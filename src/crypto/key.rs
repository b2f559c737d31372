//! Opaque key buffers for permutations and encoders.

use crate::crypto::{Hash, SecureBuffer};
use crate::error::Result;

/// Opaque key material.
///
/// A key is nothing more than a wiped byte buffer: it carries entropy into
/// permutations and encoders and supports xor-combination, but has no other
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    data: SecureBuffer,
}

impl Key {
    /// Wrap raw bytes as a key.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: SecureBuffer::from_vec(bytes.to_vec()),
        }
    }

    /// Derive a key from a password string.
    ///
    /// The key is the hash of the UTF-8 bytes. An empty password is allowed
    /// and yields the all-zero initial hash state, a deliberately weak but
    /// valid key.
    pub fn from_password(password: &str) -> Result<Self> {
        let mut hash = Hash::default();
        if !password.is_empty() {
            hash.process(password.as_bytes())?;
        }
        Ok(Self::from_bytes(hash.state()))
    }

    /// Derive a key from a finished hash state.
    pub fn from_hash(hash: &Hash) -> Self {
        Self::from_bytes(hash.state())
    }

    /// Key bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the key holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Xor-combine another key into this one over the common prefix.
    pub fn xor_with(&mut self, other: &Key) {
        let n = self.data.len().min(other.data.len());
        for i in 0..n {
            self.data[i] ^= other.data[i];
        }
    }
}

impl std::fmt::Display for Key {
    /// Hex rendering of a short fingerprint, never the raw key.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tip = &self.data[..self.data.len().min(4)];
        write!(f, "Key({}…, {} bytes)", hex::encode(tip), self.data.len())
    }
}
