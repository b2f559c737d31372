//! The per-carrier media contract and the built-in handlers.
//!
//! A medium exposes a fixed enumeration of embeddable bit positions; which
//! positions those are (pixel LSBs, DCT coefficients, packet timing) is the
//! handler's business. The local permutation scrambles this enumeration, so
//! its order only has to be stable, not secret.

use crate::config::FLAT_HEADER_LENGTH;
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One carrier medium: a file (or synthetic store) with embeddable bits.
pub trait CarrierMedium {
    /// Number of embeddable bit positions, fixed at discovery.
    ///
    /// Zero rejects the file as a carrier.
    fn raw_capacity(&self) -> u64;

    /// Read embeddable bit `pos`, `pos < raw_capacity()`.
    fn read_bit(&self, pos: u64) -> Result<bool>;

    /// Overwrite embeddable bit `pos`.
    fn write_bit(&mut self, pos: u64, value: bool) -> Result<()>;

    /// Persist modified bits back to the medium, preserving all
    /// non-payload structure.
    fn commit(&mut self) -> Result<()>;
}

/// In-memory medium for synthetic carriers and tests.
pub struct MemoryMedium {
    bits: Vec<u8>,
    capacity: u64,
}

impl MemoryMedium {
    /// Zero-filled medium with the given embeddable bit capacity.
    pub fn new(capacity_bits: u64) -> Self {
        Self {
            bits: vec![0u8; ((capacity_bits + 7) / 8) as usize],
            capacity: capacity_bits,
        }
    }

    fn check_pos(&self, pos: u64) -> Result<()> {
        if pos >= self.capacity {
            return Err(Error::IndexOutOfRange {
                index: pos,
                size: self.capacity,
            });
        }
        Ok(())
    }
}

impl CarrierMedium for MemoryMedium {
    fn raw_capacity(&self) -> u64 {
        self.capacity
    }

    fn read_bit(&self, pos: u64) -> Result<bool> {
        self.check_pos(pos)?;
        Ok((self.bits[(pos / 8) as usize] >> (pos % 8)) & 1 == 1)
    }

    fn write_bit(&mut self, pos: u64, value: bool) -> Result<()> {
        self.check_pos(pos)?;
        let byte = &mut self.bits[(pos / 8) as usize];
        let mask = 1u8 << (pos % 8);
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Degenerate file-backed handler: one embeddable bit per byte (the LSB),
/// past a preserved header.
///
/// Stands in for real image/video handlers; those live outside this crate
/// but speak the same [`CarrierMedium`] contract.
pub struct FlatMedium {
    path: PathBuf,
    bytes: Vec<u8>,
    dirty: bool,
}

impl FlatMedium {
    /// Open a file and index its embeddable positions.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            dirty: false,
        })
    }

    fn check_pos(&self, pos: u64) -> Result<u64> {
        let capacity = self.raw_capacity();
        if pos >= capacity {
            return Err(Error::IndexOutOfRange {
                index: pos,
                size: capacity,
            });
        }
        Ok(FLAT_HEADER_LENGTH + pos)
    }
}

impl CarrierMedium for FlatMedium {
    fn raw_capacity(&self) -> u64 {
        (self.bytes.len() as u64).saturating_sub(FLAT_HEADER_LENGTH)
    }

    fn read_bit(&self, pos: u64) -> Result<bool> {
        let index = self.check_pos(pos)?;
        Ok(self.bytes[index as usize] & 1 == 1)
    }

    fn write_bit(&mut self, pos: u64, value: bool) -> Result<()> {
        let index = self.check_pos(pos)?;
        let byte = &mut self.bytes[index as usize];
        let updated = (*byte & !1) | value as u8;
        if updated != *byte {
            *byte = updated;
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&self.bytes)?;
        file.sync_all()?;
        self.dirty = false;
        Ok(())
    }
}
