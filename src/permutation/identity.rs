//! Identity permutation: the trivial bijection.

use crate::crypto::Key;
use crate::error::{Error, Result};

/// Pass-through permutation, mainly useful for debugging carrier layouts.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    size: u64,
    initialized: bool,
}

impl Identity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size_using_params(&self, requested: u64, _key: &Key) -> Result<u64> {
        if requested == 0 {
            return Err(Error::DomainTooSmall {
                requested,
                minimum: 1,
            });
        }
        Ok(requested)
    }

    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        self.size = self.size_using_params(requested, key)?;
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
        Ok(index)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
