//! Carrier files and their orchestration.

pub mod file;
pub mod manager;
pub mod medium;

pub use file::CarrierFile;
pub use manager::CarrierFilesManager;
pub use medium::{CarrierMedium, FlatMedium, MemoryMedium};
