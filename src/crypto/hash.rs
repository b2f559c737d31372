//! Cryptographic hash state used for key derivation and checksums.

use crate::crypto::SecureBuffer;
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Hash algorithm handle.
///
/// Passed explicitly into every `Hash` so the algorithm choice travels with
/// the value instead of living in process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgo {
    /// SHA-256, 32-byte digests.
    #[default]
    Sha256,
}

impl HashAlgo {
    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgo::Sha256 => 32,
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgo::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// Fixed-size hash state.
///
/// Starts out as all zeros; `process` replaces it with a one-shot digest and
/// `append` folds further input into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    algo: HashAlgo,
    state: SecureBuffer,
}

impl Hash {
    /// Create an empty (all-zero) hash state.
    pub fn new(algo: HashAlgo) -> Self {
        Self {
            algo,
            state: SecureBuffer::zeroed(algo.digest_len()),
        }
    }

    /// Hash `data` in one shot into a fresh state.
    pub fn of(data: &[u8]) -> Result<Self> {
        let mut hash = Self::default();
        hash.process(data)?;
        Ok(hash)
    }

    /// Overwrite the state with the digest of `data`.
    ///
    /// Empty input is a precondition violation.
    pub fn process(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        self.state = SecureBuffer::from_vec(self.algo.digest(data));
        Ok(())
    }

    /// Fold `data` into the existing state.
    ///
    /// Computes `state = H(H(data) ‖ state)`. The inner digest binds the new
    /// input before it ever meets the prior state; collapsing this to a plain
    /// xor of digests would let appended inputs commute.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        let inner = self.algo.digest(data);
        let mut combined = Vec::with_capacity(inner.len() + self.state.len());
        combined.extend_from_slice(&inner);
        combined.extend_from_slice(&self.state);
        self.state = SecureBuffer::from_vec(self.algo.digest(&combined));
        Ok(())
    }

    /// Current state bytes.
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// Digest length of the underlying algorithm.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Always false: the state buffer has digest length from construction.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::new(HashAlgo::Sha256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_zero() {
        let hash = Hash::default();
        assert_eq!(hash.len(), 32);
        assert!(hash.state().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_process_is_deterministic() {
        let a = Hash::of(b"carrier").unwrap();
        let b = Hash::of(b"carrier").unwrap();
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_process_empty_input_fails() {
        let mut hash = Hash::default();
        assert!(matches!(hash.process(b""), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_process_overwrites_state() {
        let mut hash = Hash::of(b"first").unwrap();
        let first = hash.state().to_vec();
        hash.process(b"second").unwrap();
        assert_ne!(hash.state(), &first[..]);
        assert_eq!(hash.state(), Hash::of(b"second").unwrap().state());
    }

    #[test]
    fn test_append_two_stage_fold() {
        // append must be H(H(data) || state), not state ^= H(data)
        let mut hash = Hash::of(b"base").unwrap();
        let state_before = hash.state().to_vec();
        hash.append(b"more").unwrap();

        let algo = HashAlgo::Sha256;
        let inner = algo.digest(b"more");
        let mut combined = inner.clone();
        combined.extend_from_slice(&state_before);
        assert_eq!(hash.state(), &algo.digest(&combined)[..]);

        let xor_fold: Vec<u8> = state_before
            .iter()
            .zip(inner.iter())
            .map(|(a, b)| a ^ b)
            .collect();
        assert_ne!(hash.state(), &xor_fold[..]);
    }

    #[test]
    fn test_append_is_order_sensitive() {
        let mut ab = Hash::of(b"seed").unwrap();
        ab.append(b"a").unwrap();
        ab.append(b"b").unwrap();

        let mut ba = Hash::of(b"seed").unwrap();
        ba.append(b"b").unwrap();
        ba.append(b"a").unwrap();

        assert_ne!(ab.state(), ba.state());
    }

    #[test]
    fn test_append_empty_input_fails() {
        let mut hash = Hash::of(b"base").unwrap();
        assert!(matches!(hash.append(b""), Err(Error::EmptyInput)));
    }
}
