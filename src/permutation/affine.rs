//! Affine permutations over a prime domain.
//!
//! `permute(i) = (i*a + b) mod p` where `p` is the largest prime fitting the
//! requested domain and `a`, `b` are folded out of the key. The 32-bit
//! variant multiplies natively; the 64-bit variant goes through an
//! overflow-safe modular multiply so domains past 2^32 stay exact.

use crate::config::AFFINE_MAX_SIZE;
use crate::crypto::Key;
use crate::error::{Error, Result};
use crate::permutation::prime::{gcd, largest_prime_leq, mul_mod};

/// Resolved affine parameters for one `(requested, key)` pair.
#[derive(Debug, Clone, Copy)]
struct AffineParams {
    size: u64,
    a: u64,
    b: u64,
}

/// Fold the key into coefficients for modulus `size`.
///
/// Consecutive 8-byte chunks are xor-folded, first half of the chunks into
/// `a`, second half into `b`, then both reduced into `[size/2, size)`.
fn fold_coefficients(key: &Key, size: u64) -> (u64, u64) {
    let bytes = key.bytes();
    let chunks: Vec<u64> = bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().expect("chunk is 8 bytes")))
        .collect();
    let half = chunks.len() / 2;

    let a_raw = chunks[..half].iter().fold(0u64, |acc, &c| acc ^ c);
    let b_raw = chunks[half..].iter().fold(0u64, |acc, &c| acc ^ c);

    let lo = size / 2;
    let span = size - lo;
    (lo + a_raw % span, lo + b_raw % span)
}

fn check_key(key: &Key) -> Result<()> {
    if key.is_empty() || key.len() % 16 != 0 {
        return Err(Error::InvalidKeyLength { len: key.len() });
    }
    Ok(())
}

/// Resolve the achievable prime domain and coefficients.
///
/// Walks down through primes until the folded `a` is invertible mod the
/// prime. Shared by `init` and the pure capacity probe.
fn resolve(requested: u64, key: &Key, max_size: u64) -> Result<AffineParams> {
    check_key(key)?;

    let capped = requested.min(max_size);
    let mut prime = largest_prime_leq(capped).ok_or(Error::DomainTooSmall {
        requested,
        minimum: 2,
    })?;

    loop {
        let (a, b) = fold_coefficients(key, prime);
        if gcd(a, prime) == 1 {
            return Ok(AffineParams { size: prime, a, b });
        }
        prime = largest_prime_leq(prime - 1).ok_or(Error::DomainTooSmall {
            requested,
            minimum: 2,
        })?;
    }
}

/// Affine permutation for domains up to 2^32.
#[derive(Debug, Clone, Default)]
pub struct Affine {
    size: u64,
    a: u64,
    b: u64,
    initialized: bool,
}

impl Affine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size_using_params(&self, requested: u64, key: &Key) -> Result<u64> {
        resolve(requested, key, AFFINE_MAX_SIZE).map(|p| p.size)
    }

    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        let params = resolve(requested, key, AFFINE_MAX_SIZE)?;
        self.size = params.size;
        self.a = params.a;
        self.b = params.b;
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
        // size <= 2^32, so index * a fits in u64.
        Ok((index * self.a % self.size + self.b) % self.size)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Affine permutation for domains past 2^32.
#[derive(Debug, Clone, Default)]
pub struct Affine64 {
    size: u64,
    a: u64,
    b: u64,
    initialized: bool,
}

impl Affine64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size_using_params(&self, requested: u64, key: &Key) -> Result<u64> {
        resolve(requested, key, u64::MAX).map(|p| p.size)
    }

    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        let params = resolve(requested, key, u64::MAX)?;
        self.size = params.size;
        self.a = params.a;
        self.b = params.b;
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
        // b < size always; the subtraction form keeps the addition in u64.
        let product = mul_mod(index, self.a, self.size);
        Ok(if product >= self.size - self.b {
            product - (self.size - self.b)
        } else {
            product + self.b
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
