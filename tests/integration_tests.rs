//! End-to-end tests over real carrier files on disk.

use bitveil::carrier::{CarrierFilesManager, CarrierMedium, MemoryMedium};
use bitveil::encoding::Encoder;
use bitveil::Error;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Carrier files large enough that two of them hold a few KB of payload
/// under the Hamming codec.
const CARRIER_SIZE: usize = 60_000;

fn setup_carrier_dir(num_files: usize) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for i in 0..num_files {
        let path = dir.path().join(format!("carrier_{}.dat", i));
        // Noisy, file-specific contents so embedding has realistic seeds.
        let data: Vec<u8> = (0..CARRIER_SIZE)
            .map(|x| ((x * 31 + i * 7) % 256) as u8)
            .collect();
        fs::write(&path, &data).expect("create carrier file");
    }
    dir
}

fn open_session(root: &Path, password: &str) -> CarrierFilesManager {
    let mut manager = CarrierFilesManager::scan_directory(root).expect("scan");
    manager.set_password(password).expect("set password");
    manager
        .set_encoder(Encoder::from_name("hamming").expect("encoder"))
        .expect("set encoder");
    manager.apply_encoder().expect("apply encoder");
    manager
}

#[test]
fn test_end_to_end_round_trip() {
    let dir = setup_carrier_dir(2);
    let payload = b"the quick brown fox hides in plain sight";

    // First session: fresh media cannot hold a valid checksum yet.
    let mut manager = open_session(dir.path(), "pw");
    assert!(!manager.load_storage().expect("load"));

    manager.storage_mut().unwrap().write(0, payload).expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    // Second session over the same directory and password.
    let mut manager = open_session(dir.path(), "pw");
    assert!(manager.load_storage().expect("reload"), "checksum must validate");

    let mut out = vec![0u8; payload.len()];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(&out, payload);
}

#[test]
fn test_wrong_password_invalidates_checksum() {
    let dir = setup_carrier_dir(2);

    let mut manager = open_session(dir.path(), "pw");
    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(0, b"secret").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    let mut manager = open_session(dir.path(), "not-pw");
    assert!(
        !manager.load_storage().expect("load should not hard-fail"),
        "wrong password must surface as an invalid checksum, not an error"
    );
}

#[test]
fn test_empty_password_still_works() {
    let dir = setup_carrier_dir(2);

    let mut manager = open_session(dir.path(), "");
    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(3, b"weakly hidden").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    let mut manager = open_session(dir.path(), "");
    assert!(manager.load_storage().expect("reload"));
    let mut out = vec![0u8; 13];
    manager.storage().unwrap().read(3, &mut out).expect("read");
    assert_eq!(&out, b"weakly hidden");
}

#[test]
fn test_removing_a_carrier_invalidates_session() {
    let dir = setup_carrier_dir(3);

    let mut manager = open_session(dir.path(), "pw");
    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(0, b"spread thin").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    // The derivation folds the whole sorted carrier set; a missing file
    // reseeds every permutation.
    fs::remove_file(dir.path().join("carrier_1.dat")).expect("remove carrier");

    let mut manager = open_session(dir.path(), "pw");
    assert!(!manager.load_storage().expect("load"));
}

#[test]
fn test_corrupted_media_invalidates_checksum() {
    let dir = setup_carrier_dir(2);

    let mut manager = open_session(dir.path(), "pw");
    manager.load_storage().expect("load");
    let usable = manager.storage().unwrap().usable_capacity() as usize;
    let pattern: Vec<u8> = (0..usable).map(|i| (i % 251) as u8).collect();
    manager.storage_mut().unwrap().write(0, &pattern).expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    // Flip a couple thousand embedded LSBs in one carrier.
    let victim = dir.path().join("carrier_0.dat");
    let mut bytes = fs::read(&victim).expect("read carrier");
    for byte in bytes.iter_mut().skip(64).take(2048) {
        *byte ^= 1;
    }
    fs::write(&victim, &bytes).expect("rewrite carrier");

    let mut manager = open_session(dir.path(), "pw");
    assert!(!manager.load_storage().expect("load"));
}

#[test]
fn test_full_usable_region_round_trip() {
    let dir = setup_carrier_dir(3);

    let mut manager = open_session(dir.path(), "long session password");
    manager.load_storage().expect("load");

    let usable = manager.storage().unwrap().usable_capacity() as usize;
    assert!(usable > 1024, "fixture should give a few KB of capacity");
    let pattern: Vec<u8> = (0..usable).map(|i| (i * 37 % 256) as u8).collect();
    manager.storage_mut().unwrap().write(0, &pattern).expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    let mut manager = open_session(dir.path(), "long session password");
    assert!(manager.load_storage().expect("reload"));
    let mut out = vec![0u8; usable];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(out, pattern);
}

#[test]
fn test_undersized_carrier_in_directory_is_harmless() {
    let dir = setup_carrier_dir(2);
    // 100 bytes leaves 36 embeddable bits: enough to pass the scan, far
    // below the permutation minimum, so zero capacity.
    let runt = dir.path().join("runt.dat");
    fs::write(&runt, vec![0x55u8; 100]).expect("create runt file");

    let mut manager = open_session(dir.path(), "pw");
    assert_eq!(manager.carrier_count(), 3);
    assert!(!manager.load_storage().expect("load with runt carrier"));
    manager.storage_mut().unwrap().write(0, b"fits elsewhere").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    // The runt carries nothing and must come through untouched.
    assert_eq!(fs::read(&runt).expect("read runt"), vec![0x55u8; 100]);

    let mut manager = open_session(dir.path(), "pw");
    assert!(manager.load_storage().expect("reload"));
    let mut out = vec![0u8; 14];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(&out, b"fits elsewhere");
}

#[test]
fn test_repassword_after_unset_starts_clean() {
    let dir = setup_carrier_dir(2);

    let mut manager = open_session(dir.path(), "p1");
    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(0, b"first secret").expect("write");
    manager.save_storage().expect("save");

    // Re-key the same manager in place: every local permutation must be
    // reseeded from the new subkeys, not kept from the "p1" session.
    manager.unset_encoder();
    manager.set_password("p2").expect("password");
    manager
        .set_encoder(Encoder::from_name("hamming").expect("encoder"))
        .expect("set encoder");
    manager.apply_encoder().expect("apply");
    assert!(!manager.load_storage().expect("load under new password"));
    manager.storage_mut().unwrap().write(0, b"second secret").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    // A fresh session with the new password reads the re-keyed payload.
    let mut manager = open_session(dir.path(), "p2");
    assert!(
        manager.load_storage().expect("reload"),
        "re-keyed save must reload cleanly under the new password"
    );
    let mut out = vec![0u8; 13];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(&out, b"second secret");
}

#[test]
fn test_carriers_preserve_non_payload_bytes() {
    let dir = setup_carrier_dir(2);
    let originals: Vec<(std::path::PathBuf, Vec<u8>)> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let bytes = fs::read(&path).unwrap();
            (path, bytes)
        })
        .collect();

    let mut manager = open_session(dir.path(), "pw");
    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(0, b"payload").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    for (path, original) in originals {
        let written = fs::read(&path).unwrap();
        assert_eq!(written.len(), original.len(), "{:?} length changed", path);
        // Header and everything but the LSBs must survive verbatim.
        assert_eq!(&written[..64], &original[..64], "{:?} header changed", path);
        for (w, o) in written[64..].iter().zip(&original[64..]) {
            assert_eq!(w & 0xFE, o & 0xFE, "{:?} non-LSB bits changed", path);
        }
    }
}

#[test]
fn test_lsb_encoder_round_trip() {
    let dir = setup_carrier_dir(2);

    let mut manager = CarrierFilesManager::scan_directory(dir.path()).expect("scan");
    manager.set_password("pw").expect("password");
    manager.set_encoder(Encoder::from_name("lsb").expect("encoder")).expect("set");
    manager.set_encoder_arg_by_name("block_size", 4).expect("arg");
    manager.apply_encoder().expect("apply");

    manager.load_storage().expect("load");
    manager.storage_mut().unwrap().write(0, b"raw copy codec").expect("write");
    manager.save_storage().expect("save");
    drop(manager);

    let mut manager = CarrierFilesManager::scan_directory(dir.path()).expect("scan");
    manager.set_password("pw").expect("password");
    manager.set_encoder(Encoder::from_name("lsb").expect("encoder")).expect("set");
    manager.set_encoder_arg_by_name("block_size", 4).expect("arg");
    manager.apply_encoder().expect("apply");

    assert!(manager.load_storage().expect("reload"));
    let mut out = vec![0u8; 14];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(&out, b"raw copy codec");
}

#[test]
fn test_synthetic_media_session() {
    // Synthetic end-to-end: two in-memory carriers with known
    // raw capacities, one session, save then reload in place.
    let media: Vec<(String, Box<dyn CarrierMedium>)> = vec![
        ("alpha.dat".to_string(), Box::new(MemoryMedium::new(300_000)) as _),
        ("beta.dat".to_string(), Box::new(MemoryMedium::new(200_000)) as _),
    ];
    let mut manager = CarrierFilesManager::from_media(media).expect("media");
    manager.set_password("pw").expect("password");
    manager.set_encoder(Encoder::from_name("hamming").expect("encoder")).expect("set");
    manager.apply_encoder().expect("apply");

    assert!(!manager.load_storage().expect("first load"));
    manager.storage_mut().unwrap().write(0, b"known pattern").expect("write");
    manager.save_storage().expect("save");

    // Reload from the same (now written) media within the session.
    assert!(manager.load_storage().expect("reload"));
    let mut out = vec![0u8; 13];
    manager.storage().unwrap().read(0, &mut out).expect("read");
    assert_eq!(&out, b"known pattern");
}

#[test]
fn test_empty_directory_rejected() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        CarrierFilesManager::scan_directory(dir.path()),
        Err(Error::NoCarrierFiles(_))
    ));
}
