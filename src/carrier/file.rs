//! One carrier file: a medium bound to an encoder, a local permutation,
//! and a byte range of the virtual storage.

use crate::carrier::medium::CarrierMedium;
use crate::crypto::{Key, SecureBuffer};
use crate::encoding::Encoder;
use crate::error::{Error, Result};
use crate::permutation::{Permutation, PermutationKind};
use std::cmp::Ordering;

/// Normalize a relative path for ordering and key derivation: lowercase,
/// forward slashes. This is the single deterministic order everything
/// (sorting, master key folding, range allocation) hangs off.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

pub struct CarrierFile {
    path: String,
    medium: Box<dyn CarrierMedium>,
    /// Whole bytes of embeddable bits on the medium.
    raw_bytes: u64,
    subkey: Option<Key>,
    permutation: Permutation,
    encoder: Option<Encoder>,
    block_count: u64,
    capacity: u64,
    offset: u64,
    bytes_used: u64,
    blocks_used: u64,
}

impl CarrierFile {
    /// Bind a medium under a normalized relative path.
    pub fn new(relative_path: &str, medium: Box<dyn CarrierMedium>) -> Self {
        let raw_bytes = medium.raw_capacity() / 8;
        Self {
            path: normalize_path(relative_path),
            medium,
            raw_bytes,
            subkey: None,
            permutation: Permutation::new(PermutationKind::FeistelMix),
            encoder: None,
            block_count: 0,
            capacity: 0,
            offset: 0,
            bytes_used: 0,
            blocks_used: 0,
        }
    }

    /// Normalized relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Embeddable capacity in whole bytes, before any encoding.
    pub fn raw_bytes(&self) -> u64 {
        self.raw_bytes
    }

    /// Payload capacity in bytes under the bound encoder.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn blocks_used(&self) -> u64 {
        self.blocks_used
    }

    pub fn bytes_used(&self) -> u64 {
        self.bytes_used
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Install the carrier's subkey. A different key discards any local
    /// permutation seeded by the previous one, so a re-keyed session never
    /// reuses a stale scramble.
    pub fn set_subkey(&mut self, subkey: Key) {
        if self.subkey.as_ref() != Some(&subkey) {
            self.permutation = Permutation::new(self.permutation.kind());
        }
        self.subkey = Some(subkey);
    }

    fn subkey(&self) -> Result<&Key> {
        self.subkey.as_ref().ok_or(Error::SubkeyNotDerived)
    }

    /// Achieved bit-domain size of the local permutation, probing if it has
    /// not been initialized yet.
    fn permuted_bits(&self) -> Result<u64> {
        if self.permutation.is_initialized() {
            return Ok(self.permutation.size());
        }
        self.permutation
            .size_using_params(self.raw_bytes * 8, self.subkey()?)
    }

    /// Bind an encoder, recomputing block count and payload capacity from
    /// the permuted bit domain.
    pub fn set_encoder(&mut self, encoder: Encoder) -> Result<()> {
        let codeword_bits = encoder.codeword_block_size() as u64 * 8;
        match self.permuted_bits() {
            Ok(bits) => {
                self.block_count = bits / codeword_bits;
                self.capacity = self.block_count * encoder.data_block_size() as u64;
            }
            // A medium too small for any permutation simply has no blocks.
            Err(Error::DomainTooSmall { .. }) => {
                self.block_count = 0;
                self.capacity = 0;
            }
            Err(e) => return Err(e),
        }
        self.encoder = Some(encoder);
        Ok(())
    }

    /// Drop the encoder binding, zero the derived capacity, and discard the
    /// local permutation so the next session seeds it afresh.
    pub fn unset_encoder(&mut self) {
        self.encoder = None;
        self.permutation = Permutation::new(self.permutation.kind());
        self.block_count = 0;
        self.capacity = 0;
        self.offset = 0;
        self.bytes_used = 0;
        self.blocks_used = 0;
    }

    fn encoder(&self) -> Result<&Encoder> {
        self.encoder.as_ref().ok_or(Error::EncoderNotSet)
    }

    /// Bind this carrier to `bytes_used` bytes of virtual storage starting
    /// at `offset`.
    pub fn assign_range(&mut self, offset: u64, bytes_used: u64) -> Result<()> {
        let data_block = self.encoder()?.data_block_size() as u64;
        if bytes_used > self.capacity {
            return Err(Error::InsufficientCapacity {
                needed: bytes_used,
                available: self.capacity,
            });
        }
        self.offset = offset;
        self.bytes_used = bytes_used;
        self.blocks_used = (bytes_used + data_block - 1) / data_block;
        Ok(())
    }

    /// Initialize the local permutation over the medium's bit domain if it
    /// has not been sized yet.
    fn ensure_permutation(&mut self) -> Result<()> {
        if self.permutation.is_initialized() {
            return Ok(());
        }
        let subkey = self.subkey()?.clone();
        self.permutation.init(self.raw_bytes * 8, &subkey)
    }

    /// Pull every embeddable bit into a local buffer ordered by the local
    /// permutation.
    fn gather_bits(&self) -> Result<SecureBuffer> {
        let bits = self.permutation.size();
        let mut buffer = SecureBuffer::zeroed(((bits + 7) / 8) as usize);
        for i in 0..bits {
            let scrambled = self.permutation.permute(i)?;
            buffer.set_bit(scrambled, self.medium.read_bit(i)?);
        }
        Ok(buffer)
    }

    /// Push the local buffer back onto the medium, inverting the gather.
    fn scatter_bits(&mut self, buffer: &SecureBuffer) -> Result<()> {
        let bits = self.permutation.size();
        for i in 0..bits {
            let scrambled = self.permutation.permute(i)?;
            self.medium.write_bit(i, buffer.bit(scrambled))?;
        }
        Ok(())
    }

    /// Extract this carrier's share of hidden data into its assigned
    /// virtual-storage range.
    ///
    /// Decodes `blocks_used` codewords; a final partial block may decode a
    /// few bytes past `bytes_used`, which are dropped rather than written.
    ///
    /// A carrier with no assigned blocks (zero capacity, or nothing
    /// allocated to it) is a no-op: its bits hold no payload and its medium
    /// may be below the permutation minimum.
    pub fn load(&mut self, storage: &mut crate::storage::VirtualStorage) -> Result<()> {
        let encoder = self.encoder()?.clone();
        if self.blocks_used == 0 {
            return Ok(());
        }
        self.ensure_permutation()?;

        let buffer = self.gather_bits()?;
        let codeword_size = encoder.codeword_block_size();
        let data_size = encoder.data_block_size();
        let mut data = vec![0u8; data_size];

        for block in 0..self.blocks_used {
            let start = block as usize * codeword_size;
            encoder.extract(&buffer[start..start + codeword_size], &mut data)?;

            for (j, &byte) in data.iter().enumerate() {
                let local = block * data_size as u64 + j as u64;
                if local >= self.bytes_used {
                    break;
                }
                match storage.write_byte(self.offset + local, byte) {
                    Ok(()) | Err(Error::IndexOutOfRange { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Re-embed this carrier's assigned range and write the bit pattern
    /// back to the medium.
    ///
    /// Blocks past `blocks_used` round-trip unchanged so unused capacity is
    /// never perturbed. A carrier with no assigned blocks is a no-op, same
    /// as in [`CarrierFile::load`].
    pub fn save(&mut self, storage: &crate::storage::VirtualStorage) -> Result<()> {
        let encoder = self.encoder()?.clone();
        if self.blocks_used == 0 {
            return Ok(());
        }
        self.ensure_permutation()?;

        // Current carrier bits seed the embed, so untouched positions and
        // the unflipped bits of used codewords survive verbatim.
        let mut buffer = self.gather_bits()?;
        let codeword_size = encoder.codeword_block_size();
        let data_size = encoder.data_block_size();
        let mut data = vec![0u8; data_size];

        for block in 0..self.blocks_used {
            for (j, slot) in data.iter_mut().enumerate() {
                let local = block * data_size as u64 + j as u64;
                if local >= self.bytes_used {
                    *slot = 0;
                    continue;
                }
                *slot = match storage.read_byte(self.offset + local) {
                    Ok(byte) => byte,
                    Err(Error::IndexOutOfRange { .. }) => 0,
                    Err(e) => return Err(e),
                };
            }

            let start = block as usize * codeword_size;
            encoder.embed(&mut buffer[start..start + codeword_size], &data)?;
        }

        self.scatter_bits(&buffer)?;
        self.medium.commit()
    }
}

impl PartialEq for CarrierFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for CarrierFile {}

impl PartialOrd for CarrierFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CarrierFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl std::fmt::Debug for CarrierFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierFile")
            .field("path", &self.path)
            .field("raw_bytes", &self.raw_bytes)
            .field("capacity", &self.capacity)
            .field("offset", &self.offset)
            .field("bytes_used", &self.bytes_used)
            .finish()
    }
}
