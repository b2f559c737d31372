//! Keyed permutations over integer domains.
//!
//! Every variant is a total bijection over `[0, size)` once initialized,
//! where `size` is the largest domain the variant can achieve for the
//! requested size. `size_using_params` probes that achievable size without
//! committing, so capacity planning can run before any state is built.

pub mod affine;
pub mod feistel_mix;
pub mod feistel_num;
pub mod identity;
pub mod prime;

pub use affine::{Affine, Affine64};
pub use feistel_mix::FeistelMix;
pub use feistel_num::FeistelNum;
pub use identity::Identity;

use crate::crypto::{HashAlgo, Key};
use crate::error::{Error, Result};
use std::str::FromStr;

/// Keyed round-table entry shared by the Feistel variants.
///
/// Little-endian u64 from the first 8 digest bytes of
/// `H(key ‖ round ‖ position)`.
pub(crate) fn round_entry(key: &Key, round: u32, position: u64) -> u64 {
    let mut input = Vec::with_capacity(key.len() + 12);
    input.extend_from_slice(key.bytes());
    input.extend_from_slice(&round.to_le_bytes());
    input.extend_from_slice(&position.to_le_bytes());
    let digest = HashAlgo::Sha256.digest(&input);
    u64::from_le_bytes(digest[..8].try_into().expect("digest has 8 bytes"))
}

/// Permutation variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermutationKind {
    Identity,
    Affine,
    Affine64,
    FeistelNum,
    FeistelMix,
}

impl PermutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermutationKind::Identity => "identity",
            PermutationKind::Affine => "affine",
            PermutationKind::Affine64 => "affine64",
            PermutationKind::FeistelNum => "feistel_num",
            PermutationKind::FeistelMix => "feistel_mix",
        }
    }
}

impl FromStr for PermutationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(PermutationKind::Identity),
            "affine" => Ok(PermutationKind::Affine),
            "affine64" => Ok(PermutationKind::Affine64),
            "feistel_num" | "feistelnum" => Ok(PermutationKind::FeistelNum),
            "feistel_mix" | "feistelmix" => Ok(PermutationKind::FeistelMix),
            other => Err(Error::UnknownPermutation(other.to_string())),
        }
    }
}

/// A keyed bijection over `[0, size)`.
///
/// Closed set of variants; construct via [`Permutation::new`] or
/// [`Permutation::from_name`].
#[derive(Debug, Clone)]
pub enum Permutation {
    Identity(Identity),
    Affine(Affine),
    Affine64(Affine64),
    FeistelNum(FeistelNum),
    FeistelMix(FeistelMix),
}

impl Permutation {
    /// Construct an uninitialized permutation of the given kind.
    pub fn new(kind: PermutationKind) -> Self {
        match kind {
            PermutationKind::Identity => Permutation::Identity(Identity::new()),
            PermutationKind::Affine => Permutation::Affine(Affine::new()),
            PermutationKind::Affine64 => Permutation::Affine64(Affine64::new()),
            PermutationKind::FeistelNum => Permutation::FeistelNum(FeistelNum::new()),
            PermutationKind::FeistelMix => Permutation::FeistelMix(FeistelMix::new()),
        }
    }

    /// Resolve a variant from its name.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> PermutationKind {
        match self {
            Permutation::Identity(_) => PermutationKind::Identity,
            Permutation::Affine(_) => PermutationKind::Affine,
            Permutation::Affine64(_) => PermutationKind::Affine64,
            Permutation::FeistelNum(_) => PermutationKind::FeistelNum,
            Permutation::FeistelMix(_) => PermutationKind::FeistelMix,
        }
    }

    /// Probe the achievable domain size without touching state.
    pub fn size_using_params(&self, requested: u64, key: &Key) -> Result<u64> {
        match self {
            Permutation::Identity(p) => p.size_using_params(requested, key),
            Permutation::Affine(p) => p.size_using_params(requested, key),
            Permutation::Affine64(p) => p.size_using_params(requested, key),
            Permutation::FeistelNum(p) => p.size_using_params(requested, key),
            Permutation::FeistelMix(p) => p.size_using_params(requested, key),
        }
    }

    /// One-way transition to the initialized state.
    pub fn init(&mut self, requested: u64, key: &Key) -> Result<()> {
        match self {
            Permutation::Identity(p) => p.init(requested, key),
            Permutation::Affine(p) => p.init(requested, key),
            Permutation::Affine64(p) => p.init(requested, key),
            Permutation::FeistelNum(p) => p.init(requested, key),
            Permutation::FeistelMix(p) => p.init(requested, key),
        }
    }

    /// Map `index` through the bijection.
    pub fn permute(&self, index: u64) -> Result<u64> {
        match self {
            Permutation::Identity(p) => p.permute(index),
            Permutation::Affine(p) => p.permute(index),
            Permutation::Affine64(p) => p.permute(index),
            Permutation::FeistelNum(p) => p.permute(index),
            Permutation::FeistelMix(p) => p.permute(index),
        }
    }

    /// Achieved domain size (0 while uninitialized).
    pub fn size(&self) -> u64 {
        match self {
            Permutation::Identity(p) => p.size(),
            Permutation::Affine(p) => p.size(),
            Permutation::Affine64(p) => p.size(),
            Permutation::FeistelNum(p) => p.size(),
            Permutation::FeistelMix(p) => p.size(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        match self {
            Permutation::Identity(p) => p.is_initialized(),
            Permutation::Affine(p) => p.is_initialized(),
            Permutation::Affine64(p) => p.is_initialized(),
            Permutation::FeistelNum(p) => p.is_initialized(),
            Permutation::FeistelMix(p) => p.is_initialized(),
        }
    }
}
