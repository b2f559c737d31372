//! bitveil: hidden storage scattered across ordinary media files
//!
//! Hides one logical block of data inside an arbitrary set of carrier files
//! so that, without the right password, the hidden bits are
//! indistinguishable from carrier noise.
//!
//! # Architecture
//!
//! ```text
//! password → Hash → MasterKey → per-carrier Subkeys
//!                      │
//!                      ▼
//!  VirtualStorage (flat, checksummed, globally permuted)
//!                      │ byte ranges
//!                      ▼
//!  CarrierFile × N: local permutation → encoder → embeddable bits
//! ```
//!
//! Each carrier's embeddable bit positions are scrambled by a keyed local
//! permutation, run through a bit codec (raw LSB or syndrome-coded
//! Hamming), and bound to a contiguous range of one flat virtual buffer.
//! The buffer's own byte addresses are scrambled by a global permutation
//! keyed with the master key, and its tail holds a checksum that detects a
//! wrong password or corrupted media.
//!
//! # Example
//!
//! ```rust,no_run
//! use bitveil::carrier::CarrierFilesManager;
//! use bitveil::encoding::Encoder;
//! use std::path::Path;
//!
//! # fn main() -> bitveil::Result<()> {
//! let mut manager = CarrierFilesManager::scan_directory(Path::new("./media"))?;
//! manager.set_password("correct horse")?;
//! manager.set_encoder(Encoder::from_name("hamming")?)?;
//! manager.apply_encoder()?;
//!
//! if manager.load_storage()? {
//!     let mut buf = vec![0u8; 16];
//!     manager.storage().unwrap().read(0, &mut buf)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod carrier;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod permutation;
pub mod storage;

pub use carrier::CarrierFilesManager;
pub use error::{Error, Result};
pub use storage::VirtualStorage;
