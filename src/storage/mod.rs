//! Flat checksummed storage scattered across carriers.

pub mod virtual_storage;

pub use virtual_storage::VirtualStorage;
