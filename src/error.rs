//! Error types for bitveil.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bitveil operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bitveil operations.
///
/// Checksum mismatches after load are deliberately *not* represented here:
/// they are ordinary `bool` results, so callers can tell "wrong password or
/// corrupted media" apart from a hard fault.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during carrier file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hashing requires non-empty input.
    #[error("Cannot hash empty input")]
    EmptyInput,

    /// Out-of-range configuration parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Permutation key has the wrong length.
    #[error("Invalid key length {len}: must be a nonzero multiple of 16 bytes")]
    InvalidKeyLength { len: usize },

    /// Permutation used before `init`.
    #[error("Permutation not initialized")]
    PermutationNotInitialized,

    /// Permutation initialized twice.
    #[error("Permutation already initialized")]
    AlreadyInitialized,

    /// Index outside the permutation domain.
    #[error("Index {index} out of range for domain of size {size}")]
    IndexOutOfRange { index: u64, size: u64 },

    /// Requested domain too small for the permutation variant.
    #[error("Permutation domain too small: requested {requested}, minimum {minimum}")]
    DomainTooSmall { requested: u64, minimum: u64 },

    /// Encoder block buffer has the wrong length.
    #[error("Block size mismatch: expected {expected} bytes, got {actual}")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// Carrier operation before its subkey was derived.
    #[error("Carrier subkey not derived")]
    SubkeyNotDerived,

    /// Operation requires an encoder to be set and applied.
    #[error("No active encoder: call set_encoder and apply_encoder first")]
    EncoderNotSet,

    /// Encoder parameters cannot change while the encoder is active.
    #[error("Encoder is active: unset_encoder before changing parameters")]
    EncoderActive,

    /// Aggregate carrier capacity is zero or insufficient.
    #[error("Insufficient carrier capacity: need {needed} bytes, have {available}")]
    InsufficientCapacity { needed: u64, available: u64 },

    /// Storage buffer has not been sized via apply_permutation.
    #[error("Virtual storage not sized")]
    StorageNotSized,

    /// Storage access before a successful load.
    #[error("Virtual storage not loaded")]
    StorageNotLoaded,

    /// Storage read/write past the usable region.
    #[error("Storage access out of bounds: offset {offset} + len {len} > usable {usable}")]
    StorageOutOfBounds { offset: u64, len: u64, usable: u64 },

    /// No usable carrier files found in directory.
    #[error("No carrier files found in directory: {}", .0.display())]
    NoCarrierFiles(PathBuf),

    /// Unknown permutation variant name.
    #[error("Unknown permutation: {0}")]
    UnknownPermutation(String),

    /// Unknown encoder variant name.
    #[error("Unknown encoder: {0}")]
    UnknownEncoder(String),
}
