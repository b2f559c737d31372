//! Syndrome-coding Hamming codec.
//!
//! Non-systematic use of the Hamming code: one codeword is `2^k - 1` carrier
//! bits whose syndrome (xor of the 1-based positions of set bits) directly
//! *is* the k-bit payload. Embedding drives the syndrome to the desired
//! value by flipping at most one bit, so each codeword perturbs the carrier
//! by at most one bit position.

use crate::config::{HAMMING_DEFAULT_PARITY, HAMMING_MAX_PARITY, HAMMING_MIN_PARITY};
use crate::encoding::{get_bit, set_bit};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammingEncoder {
    parity_bits: u8,
    codeword_bits: usize,
    codewords_per_block: usize,
    data_block_size: usize,
    codeword_block_size: usize,
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl HammingEncoder {
    /// Create an encoder with `parity_bits` in `[3, 8]`.
    pub fn new(parity_bits: u8) -> Result<Self> {
        if !(HAMMING_MIN_PARITY..=HAMMING_MAX_PARITY).contains(&parity_bits) {
            return Err(Error::InvalidParameter(format!(
                "hamming parity bits {} outside [{}, {}]",
                parity_bits, HAMMING_MIN_PARITY, HAMMING_MAX_PARITY
            )));
        }
        let k = parity_bits as usize;
        let codeword_bits = (1usize << k) - 1;
        // lcm(k, 8) payload bits per block keeps data blocks byte-aligned.
        let codewords_per_block = 8 / gcd(k, 8);
        let data_block_size = k * codewords_per_block / 8;
        let codeword_block_bits = codewords_per_block * codeword_bits;
        let codeword_block_size = (codeword_block_bits + 7) / 8;

        Ok(Self {
            parity_bits,
            codeword_bits,
            codewords_per_block,
            data_block_size,
            codeword_block_size,
        })
    }

    pub fn parity_bits(&self) -> u8 {
        self.parity_bits
    }

    /// Payload bytes carried per block.
    pub fn data_block_size(&self) -> usize {
        self.data_block_size
    }

    /// Carrier bytes consumed per block. Trailing pad bits in the final
    /// byte are never read or written.
    pub fn codeword_block_size(&self) -> usize {
        self.codeword_block_size
    }

    /// Syndrome of codeword `index` within the block: xor of the 1-based
    /// positions of all set bits.
    fn syndrome(&self, codeword: &[u8], index: usize) -> u64 {
        let base = index * self.codeword_bits;
        let mut s = 0u64;
        for j in 0..self.codeword_bits {
            if get_bit(codeword, base + j) {
                s ^= (j + 1) as u64;
            }
        }
        s
    }

    fn read_payload(&self, data: &[u8], index: usize) -> u64 {
        let base = index * self.parity_bits as usize;
        let mut v = 0u64;
        for t in 0..self.parity_bits as usize {
            if get_bit(data, base + t) {
                v |= 1 << t;
            }
        }
        v
    }

    fn write_payload(&self, data: &mut [u8], index: usize, value: u64) {
        let base = index * self.parity_bits as usize;
        for t in 0..self.parity_bits as usize {
            set_bit(data, base + t, (value >> t) & 1 == 1);
        }
    }

    /// Drive each codeword's syndrome to the corresponding payload value.
    ///
    /// Seed codeword contents are arbitrary; at most one bit per codeword
    /// changes.
    pub fn embed(&self, codeword: &mut [u8], data: &[u8]) -> Result<()> {
        self.check_blocks(codeword.len(), data.len())?;

        for c in 0..self.codewords_per_block {
            let desired = self.read_payload(data, c);
            let current = self.syndrome(codeword, c);
            let diff = current ^ desired;
            if diff != 0 {
                // Flipping bit at 1-based position `diff` xors the syndrome
                // with exactly `diff`.
                let pos = c * self.codeword_bits + (diff as usize - 1);
                set_bit(codeword, pos, !get_bit(codeword, pos));
            }
        }
        Ok(())
    }

    /// Recover each codeword's payload by recomputing its syndrome.
    pub fn extract(&self, codeword: &[u8], data: &mut [u8]) -> Result<()> {
        self.check_blocks(codeword.len(), data.len())?;

        for c in 0..self.codewords_per_block {
            let value = self.syndrome(codeword, c);
            self.write_payload(data, c, value);
        }
        Ok(())
    }

    fn check_blocks(&self, codeword_len: usize, data_len: usize) -> Result<()> {
        if codeword_len != self.codeword_block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.codeword_block_size,
                actual: codeword_len,
            });
        }
        if data_len != self.data_block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.data_block_size,
                actual: data_len,
            });
        }
        Ok(())
    }
}

impl Default for HammingEncoder {
    fn default() -> Self {
        Self::new(HAMMING_DEFAULT_PARITY).expect("default parity bits are valid")
    }
}
