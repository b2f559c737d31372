//! Orchestration: carrier discovery, key derivation, capacity allocation,
//! and load/save of the virtual storage.
//!
//! Nothing is persisted beyond the carrier files themselves. Capacity,
//! ordering, and offsets are recomputed from the sorted directory listing
//! plus the password on every open, so adding, removing, or renaming a
//! carrier invalidates the whole derivation for that session.

use crate::carrier::file::CarrierFile;
use crate::carrier::medium::{CarrierMedium, FlatMedium};
use crate::crypto::{Hash, Key};
use crate::encoding::Encoder;
use crate::error::{Error, Result};
use crate::storage::VirtualStorage;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Encoder lifecycle: parameters may only change while no encoder is
/// applied to the carrier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
    Unset,
    Set,
    Active,
}

pub struct CarrierFilesManager {
    carriers: Vec<CarrierFile>,
    password_hash: Hash,
    master_key: Option<Key>,
    encoder: Option<Encoder>,
    state: EncoderState,
    storage: Option<VirtualStorage>,
    total_capacity: u64,
}

impl CarrierFilesManager {
    /// Scan a directory for usable carrier files.
    ///
    /// Files are opened with the flat handler; hidden files and files with
    /// zero embeddable capacity are skipped. Carriers sort by normalized
    /// relative path.
    pub fn scan_directory(root: &Path) -> Result<Self> {
        let mut carriers = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }

            let medium = match FlatMedium::open(path) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if medium.raw_capacity() < 8 {
                debug!(path = %path.display(), "Skipping file with no embeddable capacity");
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            carriers.push(CarrierFile::new(&relative, Box::new(medium)));
        }

        if carriers.is_empty() {
            return Err(Error::NoCarrierFiles(root.to_path_buf()));
        }

        info!(
            count = carriers.len(),
            root = %root.display(),
            "Discovered carrier files"
        );
        Ok(Self::from_carriers(carriers))
    }

    /// Build a manager over explicit media (synthetic carriers, tests,
    /// external format handlers).
    pub fn from_media(media: Vec<(String, Box<dyn CarrierMedium>)>) -> Result<Self> {
        let carriers: Vec<CarrierFile> = media
            .into_iter()
            .map(|(path, medium)| CarrierFile::new(&path, medium))
            .filter(|c| c.raw_bytes() > 0)
            .collect();
        if carriers.is_empty() {
            return Err(Error::NoCarrierFiles(Default::default()));
        }
        Ok(Self::from_carriers(carriers))
    }

    fn from_carriers(mut carriers: Vec<CarrierFile>) -> Self {
        carriers.sort();
        Self {
            carriers,
            password_hash: Hash::default(),
            master_key: None,
            encoder: None,
            state: EncoderState::Unset,
            storage: None,
            total_capacity: 0,
        }
    }

    /// Set the session password. An empty password is allowed and leaves
    /// the zero hash state as a (weak) secret.
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        let mut hash = Hash::default();
        if !password.is_empty() {
            hash.process(password.as_bytes())?;
        }
        self.password_hash = hash;
        Ok(())
    }

    /// Choose the encoder template. Rejected while an encoder is applied.
    pub fn set_encoder(&mut self, encoder: Encoder) -> Result<()> {
        if self.state == EncoderState::Active {
            return Err(Error::EncoderActive);
        }
        self.encoder = Some(encoder);
        self.state = EncoderState::Set;
        Ok(())
    }

    /// Adjust one named parameter of the chosen encoder.
    pub fn set_encoder_arg_by_name(&mut self, name: &str, value: u64) -> Result<()> {
        if self.state == EncoderState::Active {
            return Err(Error::EncoderActive);
        }
        self.encoder
            .as_mut()
            .ok_or(Error::EncoderNotSet)?
            .set_arg_by_name(name, value)
    }

    /// Derive session keys and bind the encoder to every carrier.
    ///
    /// Fails with a capacity error if the carrier set cannot hold a single
    /// byte under the chosen encoder.
    pub fn apply_encoder(&mut self) -> Result<()> {
        let encoder = self.encoder.clone().ok_or(Error::EncoderNotSet)?;

        self.derive_keys()?;

        let mut total = 0u64;
        for carrier in &mut self.carriers {
            carrier.set_encoder(encoder.clone())?;
            total += carrier.capacity();
        }
        if total == 0 {
            return Err(Error::InsufficientCapacity {
                needed: 1,
                available: 0,
            });
        }

        self.total_capacity = total;
        self.state = EncoderState::Active;
        info!(
            carriers = self.carriers.len(),
            total_capacity = total,
            "Encoder applied"
        );
        Ok(())
    }

    /// Cascade the encoder unbinding to every carrier and drop the derived
    /// session keys.
    pub fn unset_encoder(&mut self) {
        for carrier in &mut self.carriers {
            carrier.unset_encoder();
        }
        self.encoder = None;
        self.master_key = None;
        self.storage = None;
        self.total_capacity = 0;
        self.state = EncoderState::Unset;
    }

    /// Fold the password hash and the sorted carrier set into the master
    /// key, then hand each carrier its subkey.
    fn derive_keys(&mut self) -> Result<()> {
        // Master key binds the password to the exact carrier set: the fold
        // starts from the password hash and appends each carrier's identity
        // in sorted order.
        let mut master = Hash::default();
        master.process(self.password_hash.state())?;
        for carrier in &self.carriers {
            let identity = Hash::of(carrier.path().as_bytes())?;
            master.append(identity.state())?;
        }
        let master_key = Key::from_hash(&master);

        for (index, carrier) in self.carriers.iter_mut().enumerate() {
            let mut input =
                Vec::with_capacity(master_key.len() + 8 + carrier.path().len());
            input.extend_from_slice(master_key.bytes());
            input.extend_from_slice(&(index as u64).to_le_bytes());
            input.extend_from_slice(carrier.path().as_bytes());
            carrier.set_subkey(Key::from_hash(&Hash::of(&input)?));
        }

        debug!(carriers = self.carriers.len(), "Session keys derived");
        self.master_key = Some(master_key);
        Ok(())
    }

    fn require_active(&self) -> Result<()> {
        if self.state != EncoderState::Active {
            return Err(Error::EncoderNotSet);
        }
        Ok(())
    }

    /// Aggregate payload capacity in bytes. State error before
    /// `apply_encoder`.
    pub fn capacity(&self) -> Result<u64> {
        self.require_active()?;
        Ok(self.total_capacity)
    }

    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }

    pub fn carriers(&self) -> &[CarrierFile] {
        &self.carriers
    }

    pub fn is_active_encoder(&self) -> bool {
        self.state == EncoderState::Active
    }

    /// Size the virtual storage, assign carrier ranges, and load every
    /// carrier's share.
    ///
    /// Returns whether the assembled storage's checksum validates. `false`
    /// means wrong password or corrupted media, not a hard fault.
    pub fn load_storage(&mut self) -> Result<bool> {
        self.require_active()?;
        let master_key = self.master_key.clone().ok_or(Error::EncoderNotSet)?;

        let mut storage = VirtualStorage::new();
        storage.apply_permutation(self.total_capacity, &master_key)?;

        // Greedy contiguous allocation in sorted carrier order; every
        // carrier gets a range, zero-length ones included, so their bits
        // still round-trip on save.
        let mut remaining = storage.raw_capacity();
        let mut offset = 0u64;
        for carrier in &mut self.carriers {
            let used = remaining.min(carrier.capacity());
            carrier.assign_range(offset, used)?;
            offset += used;
            remaining -= used;
        }

        for carrier in &mut self.carriers {
            carrier.load(&mut storage)?;
        }

        let valid = storage.is_valid_checksum()?;
        info!(
            raw_capacity = storage.raw_capacity(),
            usable_capacity = storage.usable_capacity(),
            checksum_valid = valid,
            "Virtual storage loaded"
        );
        self.storage = Some(storage);
        Ok(valid)
    }

    /// Stamp the checksum and write every carrier's share back to its
    /// medium.
    pub fn save_storage(&mut self) -> Result<()> {
        self.require_active()?;
        let storage = self.storage.as_mut().ok_or(Error::StorageNotLoaded)?;

        storage.write_checksum()?;
        for carrier in &mut self.carriers {
            carrier.save(storage)?;
        }
        info!(carriers = self.carriers.len(), "Virtual storage saved");
        Ok(())
    }

    /// The loaded virtual storage.
    pub fn storage(&self) -> Result<&VirtualStorage> {
        self.storage.as_ref().ok_or(Error::StorageNotLoaded)
    }

    /// The loaded virtual storage, mutably.
    pub fn storage_mut(&mut self) -> Result<&mut VirtualStorage> {
        self.storage.as_mut().ok_or(Error::StorageNotLoaded)
    }
}

impl std::fmt::Debug for CarrierFilesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierFilesManager")
            .field("carriers", &self.carriers.len())
            .field("state", &self.state)
            .field("total_capacity", &self.total_capacity)
            .finish()
    }
}
