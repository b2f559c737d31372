//! Owned byte buffer that wipes itself with random data on release.

use rand::RngCore;
use std::ops::{Deref, DerefMut};

/// Byte buffer for secret material.
///
/// On drop the contents are overwritten with random bytes before the
/// allocation is released, so key material and plaintext never linger in
/// freed memory as recognizable patterns.
pub struct SecureBuffer {
    data: Vec<u8>,
}

impl SecureBuffer {
    /// Create a zero-filled buffer of the given length.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    /// Take ownership of an existing byte vector.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resize the buffer, zero-filling any new tail.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, 0);
    }

    /// Overwrite the whole buffer with random bytes.
    pub fn randomize(&mut self) {
        rand::thread_rng().fill_bytes(&mut self.data);
    }

    /// Set all bytes to zero.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Read a single bit, bit `pos` of the buffer (LSB-first within bytes).
    pub fn bit(&self, pos: u64) -> bool {
        let byte = self.data[(pos / 8) as usize];
        (byte >> (pos % 8)) & 1 == 1
    }

    /// Write a single bit at position `pos` (LSB-first within bytes).
    pub fn set_bit(&mut self, pos: u64, value: bool) {
        let byte = &mut self.data[(pos / 8) as usize];
        let mask = 1u8 << (pos % 8);
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

impl Deref for SecureBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for SecureBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Clone for SecureBuffer {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl PartialEq for SecureBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for SecureBuffer {}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBuffer({} bytes)", self.data.len())
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        // Anti-forensic wipe: random data, not zeros.
        if !self.data.is_empty() {
            rand::thread_rng().fill_bytes(&mut self.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_buffer() {
        let buf = SecureBuffer::zeroed(16);
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_deref_and_mutate() {
        let mut buf = SecureBuffer::from_vec(vec![1, 2, 3]);
        buf[1] = 9;
        assert_eq!(&buf[..], &[1, 9, 3]);
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut buf = SecureBuffer::from_vec(vec![0xFF; 4]);
        buf.resize(8);
        assert_eq!(&buf[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_bit_access() {
        let mut buf = SecureBuffer::zeroed(2);
        buf.set_bit(0, true);
        buf.set_bit(9, true);
        assert!(buf.bit(0));
        assert!(!buf.bit(1));
        assert!(buf.bit(9));
        assert_eq!(buf[0], 0b0000_0001);
        assert_eq!(buf[1], 0b0000_0010);

        buf.set_bit(0, false);
        assert!(!buf.bit(0));
    }

    #[test]
    fn test_randomize_changes_contents() {
        let mut buf = SecureBuffer::zeroed(64);
        buf.randomize();
        assert!(buf.iter().any(|&b| b != 0));
    }
}
