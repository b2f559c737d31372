//! Identity codec: data bits map straight onto carrier bits.

use crate::config::{LSB_DEFAULT_BLOCK, LSB_MAX_BLOCK, LSB_MIN_BLOCK};
use crate::error::{Error, Result};

/// Raw-copy codec with equal data and codeword block sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsbEncoder {
    block_size: usize,
}

impl LsbEncoder {
    /// Create an encoder with the given block size.
    ///
    /// The block size must be a power of two in `[1, 1024]` bytes.
    pub fn new(block_size: usize) -> Result<Self> {
        if !(LSB_MIN_BLOCK..=LSB_MAX_BLOCK).contains(&block_size)
            || !block_size.is_power_of_two()
        {
            return Err(Error::InvalidParameter(format!(
                "lsb block size {} must be a power of two in [{}, {}]",
                block_size, LSB_MIN_BLOCK, LSB_MAX_BLOCK
            )));
        }
        Ok(Self { block_size })
    }

    pub fn data_block_size(&self) -> usize {
        self.block_size
    }

    pub fn codeword_block_size(&self) -> usize {
        self.block_size
    }

    pub fn embed(&self, codeword: &mut [u8], data: &[u8]) -> Result<()> {
        self.check_blocks(codeword.len(), data.len())?;
        codeword.copy_from_slice(data);
        Ok(())
    }

    pub fn extract(&self, codeword: &[u8], data: &mut [u8]) -> Result<()> {
        self.check_blocks(codeword.len(), data.len())?;
        data.copy_from_slice(codeword);
        Ok(())
    }

    fn check_blocks(&self, codeword_len: usize, data_len: usize) -> Result<()> {
        if codeword_len != self.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: codeword_len,
            });
        }
        if data_len != self.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: data_len,
            });
        }
        Ok(())
    }
}

impl Default for LsbEncoder {
    fn default() -> Self {
        Self {
            block_size: LSB_DEFAULT_BLOCK,
        }
    }
}
