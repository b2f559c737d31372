//! Configuration constants for bitveil.

/// Default hash digest length in bytes (SHA-256).
pub const DIGEST_LENGTH: usize = 32;

/// Length of the checksum region at the tail of virtual storage.
pub const CHECKSUM_LENGTH: u64 = DIGEST_LENGTH as u64;

/// Number of Feistel rounds for both Feistel permutation variants.
pub const FEISTEL_ROUNDS: usize = 5;

/// Minimum domain size accepted by the Feistel permutation variants.
pub const FEISTEL_MIN_SIZE: u64 = 1024;

/// Minimum bit length of the domain for the bit-field Feistel variant.
pub const FEISTEL_MIX_MIN_BITS: u32 = 8;

/// Largest domain the 32-bit affine permutation supports without overflow.
pub const AFFINE_MAX_SIZE: u64 = 1 << 32;

/// Hamming encoder parity bits range.
pub const HAMMING_MIN_PARITY: u8 = 3;
pub const HAMMING_MAX_PARITY: u8 = 8;

/// Default Hamming parity bits.
pub const HAMMING_DEFAULT_PARITY: u8 = 5;

/// LSB encoder block size range in bytes (must be a power of two).
pub const LSB_MIN_BLOCK: usize = 1;
pub const LSB_MAX_BLOCK: usize = 1024;

/// Default LSB block size.
pub const LSB_DEFAULT_BLOCK: usize = 1;

/// Bytes of a flat carrier file preserved as header (no embedding).
pub const FLAT_HEADER_LENGTH: u64 = 64;
