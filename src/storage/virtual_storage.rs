//! The flat, checksummed virtual address space.
//!
//! One buffer of `raw_capacity = usable_capacity + checksum_length` bytes.
//! Carrier load/save goes through the permuted byte accessors so the global
//! permutation scrambles byte addresses exactly once, when the buffer is
//! populated; ordinary clients use the direct `read`/`write` over the
//! usable region. The permuted accessors are crate-internal so the two
//! addressing modes cannot be mixed from outside.

use crate::config::CHECKSUM_LENGTH;
use crate::crypto::{Hash, HashAlgo, Key, SecureBuffer};
use crate::error::{Error, Result};
use crate::permutation::{Permutation, PermutationKind};

pub struct VirtualStorage {
    buffer: SecureBuffer,
    permutation: Permutation,
    usable_capacity: u64,
    algo: HashAlgo,
}

impl VirtualStorage {
    /// Storage with the default global permutation (bit-field Feistel).
    pub fn new() -> Self {
        Self::with_permutation(Permutation::new(PermutationKind::FeistelMix))
    }

    /// Storage with an explicit global permutation (must be uninitialized).
    pub fn with_permutation(permutation: Permutation) -> Self {
        Self {
            buffer: SecureBuffer::zeroed(0),
            permutation,
            usable_capacity: 0,
            algo: HashAlgo::Sha256,
        }
    }

    /// Initialize the global permutation and size the buffer to the
    /// achieved domain.
    ///
    /// Fails if the achievable size cannot hold anything beyond the
    /// checksum region.
    pub fn apply_permutation(&mut self, requested: u64, key: &Key) -> Result<()> {
        self.permutation.init(requested, key)?;
        let achieved = self.permutation.size();
        if achieved <= CHECKSUM_LENGTH {
            return Err(Error::InsufficientCapacity {
                needed: CHECKSUM_LENGTH + 1,
                available: achieved,
            });
        }
        self.buffer.resize(achieved as usize);
        self.usable_capacity = achieved - CHECKSUM_LENGTH;
        Ok(())
    }

    /// Total buffer size, usable region plus checksum (0 while unsized).
    pub fn raw_capacity(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Bytes available to clients.
    pub fn usable_capacity(&self) -> u64 {
        self.usable_capacity
    }

    pub fn is_sized(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn check_sized(&self) -> Result<()> {
        if self.buffer.is_empty() {
            return Err(Error::StorageNotSized);
        }
        Ok(())
    }

    /// Read one byte at the permuted address for `pos`.
    ///
    /// Carrier load/save only; `pos` ranges over the whole raw capacity.
    pub(crate) fn read_byte(&self, pos: u64) -> Result<u8> {
        self.check_sized()?;
        let index = self.permutation.permute(pos)?;
        Ok(self.buffer[index as usize])
    }

    /// Write one byte at the permuted address for `pos`.
    pub(crate) fn write_byte(&mut self, pos: u64, value: u8) -> Result<()> {
        self.check_sized()?;
        let index = self.permutation.permute(pos)?;
        self.buffer[index as usize] = value;
        Ok(())
    }

    /// Sequential read from the usable region, no address permutation.
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.check_sized()?;
        let len = buf.len() as u64;
        if offset.checked_add(len).map_or(true, |end| end > self.usable_capacity) {
            return Err(Error::StorageOutOfBounds {
                offset,
                len,
                usable: self.usable_capacity,
            });
        }
        buf.copy_from_slice(&self.buffer[offset as usize..(offset + len) as usize]);
        Ok(())
    }

    /// Sequential write into the usable region, no address permutation.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.check_sized()?;
        let len = data.len() as u64;
        if offset.checked_add(len).map_or(true, |end| end > self.usable_capacity) {
            return Err(Error::StorageOutOfBounds {
                offset,
                len,
                usable: self.usable_capacity,
            });
        }
        self.buffer[offset as usize..(offset + len) as usize].copy_from_slice(data);
        Ok(())
    }

    /// Overwrite the trailing checksum region with the hash of the usable
    /// region.
    pub fn write_checksum(&mut self) -> Result<()> {
        self.check_sized()?;
        let digest = self.usable_digest()?;
        let start = self.usable_capacity as usize;
        self.buffer[start..start + digest.len()].copy_from_slice(&digest);
        Ok(())
    }

    /// Whether the trailing checksum matches the usable region.
    ///
    /// A mismatch means wrong password or corrupted media, so it is a value,
    /// not an error.
    pub fn is_valid_checksum(&self) -> Result<bool> {
        self.check_sized()?;
        let digest = self.usable_digest()?;
        let start = self.usable_capacity as usize;
        Ok(self.buffer[start..start + digest.len()] == digest[..])
    }

    fn usable_digest(&self) -> Result<Vec<u8>> {
        let mut hash = Hash::new(self.algo);
        hash.process(&self.buffer[..self.usable_capacity as usize])?;
        Ok(hash.state().to_vec())
    }
}

impl Default for VirtualStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VirtualStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualStorage")
            .field("raw_capacity", &self.raw_capacity())
            .field("usable_capacity", &self.usable_capacity)
            .field("permutation", &self.permutation.kind())
            .finish()
    }
}
