//! End-to-end search: find a short prefix, persist the key set, and
//! verify the files agree with each other.

use crossbeam_channel::{bounded, unbounded};
use std::fs;
use tor_vanity_keygen::{keyfile, onion, Searcher};

#[test]
fn search_persists_consistent_key_set() {
    let dir = std::env::temp_dir().join(format!("tvk-e2e-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let (progress_tx, _progress_rx) = unbounded();
    let (_stop_tx, stop_rx) = bounded(1);

    let outcome = Searcher::with_threads(2)
        .run("b", &dir, progress_tx, stop_rx)
        .unwrap();

    assert!(outcome.onion_address.starts_with('b'));
    assert_eq!(outcome.onion_address.len(), 56);
    assert!(outcome.attempts >= 1);

    // Secret key: tagged header + 64-byte expanded secret, clamped.
    let secret = fs::read(dir.join(keyfile::SECRET_KEY_FILE)).unwrap();
    assert_eq!(secret.len(), 96);
    assert!(secret.starts_with(b"== ed25519v1-secret: type0 ==\0\0\0"));
    assert_eq!(secret[32] & 0x07, 0);
    assert_eq!(secret[95] & 0x80, 0);
    assert_eq!(secret[95] & 0x40, 0x40);

    // Public key: tagged header + 32-byte key that re-derives the
    // address in the hostname file.
    let public = fs::read(dir.join(keyfile::PUBLIC_KEY_FILE)).unwrap();
    assert_eq!(public.len(), 64);
    assert!(public.starts_with(b"== ed25519v1-public: type0 ==\0\0\0"));
    let mut public_bytes = [0u8; 32];
    public_bytes.copy_from_slice(&public[32..]);
    assert_eq!(onion::onion_address(&public_bytes), outcome.onion_address);

    let hostname = fs::read_to_string(dir.join(keyfile::HOSTNAME_FILE)).unwrap();
    assert_eq!(hostname, format!("{}.onion\n", outcome.onion_address));

    fs::remove_dir_all(&dir).unwrap();
}
