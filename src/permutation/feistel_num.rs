//! Numeric Feistel permutation over a square domain.
//!
//! The index is split into two base-`M` digits (`M = floor(sqrt(requested))`)
//! and pushed through five rounds of keyed substitution tables, alternating
//! which digit is updated. The domain is `M*M`, so some of the requested
//! range is shaved off; capacity planning accounts for that via the probe.

use crate::config::{FEISTEL_MIN_SIZE, FEISTEL_ROUNDS};
use crate::crypto::Key;
use crate::error::{Error, Result};
use crate::permutation::round_entry;

#[derive(Debug, Clone, Default)]
pub struct FeistelNum {
    size: u64,
    base: u64,
    tables: Vec<Vec<u64>>,
    initialized: bool,
}

fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) {
        x += 1;
    }
    x
}

impl FeistelNum {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_base(requested: u64, key: &Key) -> Result<u64> {
        if key.is_empty() {
            return Err(Error::InvalidKeyLength { len: 0 });
        }
        if requested < FEISTEL_MIN_SIZE {
            return Err(Error::DomainTooSmall {
                requested,
                minimum: FEISTEL_MIN_SIZE,
            });
        }
        Ok(isqrt(requested))
    }

    pub fn size_using_params(&self, requested: u64, key: &Key) -> Result<u64> {
        let base = Self::resolve_base(requested, key)?;
        Ok(base * base)
    }

    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        let base = Self::resolve_base(requested, key)?;

        // One substitution table per round, M entries each.
        let mut tables = Vec::with_capacity(FEISTEL_ROUNDS);
        for round in 0..FEISTEL_ROUNDS {
            let table: Vec<u64> = (0..base)
                .map(|pos| round_entry(key, round as u32, pos) % base)
                .collect();
            tables.push(table);
        }

        self.base = base;
        self.size = base * base;
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

        let mut left = index / self.base;
        let mut right = index % self.base;

        for (round, table) in self.tables.iter().enumerate() {
            if round % 2 == 0 {
                left = (left + table[right as usize]) % self.base;
            } else {
                right = (right + table[left as usize]) % self.base;
            }
        }

        Ok(left * self.base + right)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
