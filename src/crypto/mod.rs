//! Key material, hashing, and wiped buffers.

pub mod buffer;
pub mod hash;
pub mod key;

pub use buffer::SecureBuffer;
pub use hash::{Hash, HashAlgo};
pub use key::Key;
