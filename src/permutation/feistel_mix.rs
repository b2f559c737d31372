//! Bit-field Feistel permutation.
//!
//! Splits the index into a masked right bit-field and a modular left field,
//! then runs five rounds alternating a modular-add update of the left half
//! with an xor update of the right half. Covers more of the requested range
//! than the square-domain variant because only the left field is reduced.

use crate::config::{FEISTEL_MIX_MIN_BITS, FEISTEL_MIN_SIZE, FEISTEL_ROUNDS};
use crate::crypto::Key;
use crate::error::{Error, Result};
use crate::permutation::round_entry;

/// Resolved bit-field split for one requested size.
#[derive(Debug, Clone, Copy, Default)]
struct FieldSplit {
    right_bits: u32,
    right_mask: u64,
    left_mod: u64,
}

impl FieldSplit {
    fn size(&self) -> u64 {
        self.left_mod << self.right_bits
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeistelMix {
    size: u64,
    split: FieldSplit,
    tables: Vec<Vec<u64>>,
    initialized: bool,
}

impl FeistelMix {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_split(requested: u64, key: &Key) -> Result<FieldSplit> {
        if key.is_empty() {
            return Err(Error::InvalidKeyLength { len: 0 });
        }
        if requested < FEISTEL_MIN_SIZE {
            return Err(Error::DomainTooSmall {
                requested,
                minimum: FEISTEL_MIN_SIZE,
            });
        }
        let bit_len = 64 - requested.leading_zeros();
        if bit_len < FEISTEL_MIX_MIN_BITS {
            return Err(Error::DomainTooSmall {
                requested,
                minimum: 1u64 << (FEISTEL_MIX_MIN_BITS - 1),
            });
        }

        let mut right_bits = bit_len / 2;
        let mut right_mask = (1u64 << right_bits) - 1;
        let mut left_mod = requested >> right_bits;

        // The xor'd right field must be at least as wide as the left modulus
        // so the round tables can be indexed by either half. Steal bits from
        // the left until it is.
        while right_mask < left_mod {
            right_bits += 1;
            right_mask = (1u64 << right_bits) - 1;
            left_mod = requested >> right_bits;
        }

        let split = FieldSplit {
            right_bits,
            right_mask,
            left_mod,
        };
        if split.left_mod == 0 || split.size() == 0 {
            return Err(Error::DomainTooSmall {
                requested,
                minimum: FEISTEL_MIN_SIZE,
            });
        }
        Ok(split)
    }

    pub fn size_using_params(&self, requested: u64, key: &Key) -> Result<u64> {
        Self::resolve_split(requested, key).map(|s| s.size())
    }

    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        let split = Self::resolve_split(requested, key)?;

        let entries = split.right_mask + 1;
        let mut tables = Vec::with_capacity(FEISTEL_ROUNDS);
        for round in 0..FEISTEL_ROUNDS {
            let table: Vec<u64> = (0..entries)
                .map(|pos| round_entry(key, round as u32, pos))
                .collect();
            tables.push(table);
        }

        self.size = split.size();
        self.split = split;
        self.tables = tables;
        self.initialized = true;
        Ok(())
    }

    pub fn permute(&self, index: u64) -> Result<u64> {
        if !self.initialized {
            return Err(Error::PermutationNotInitialized);
        }
        if index >= self.size {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.size,
            });
        }

        let split = &self.split;
        let mut left = index >> split.right_bits;
        let mut right = index & split.right_mask;

        for (round, table) in self.tables.iter().enumerate() {
            if round % 2 == 0 {
                left = (left + table[right as usize]) % split.left_mod;
            } else {
                right ^= table[left as usize] & split.right_mask;
            }
        }

        Ok((left << split.right_bits) | right)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
