//! Tor tagged-data key files
//!
//! Tor stores hidden service keys with a 32-byte header: the NUL-padded
//! string "== <typestring>: type0 ==" followed directly by the raw
//! payload, with no length field. A wrong tag or padding count produces
//! a file Tor refuses to load.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Typestring for the expanded secret key file
pub const SECRET_TAG: &str = "ed25519v1-secret";

/// Typestring for the public key file
pub const PUBLIC_TAG: &str = "ed25519v1-public";

/// File name of the secret key inside a hidden service directory
pub const SECRET_KEY_FILE: &str = "hs_ed25519_secret_key";

/// File name of the public key inside a hidden service directory
pub const PUBLIC_KEY_FILE: &str = "hs_ed25519_public_key";

/// File name of the hostname file inside a hidden service directory
pub const HOSTNAME_FILE: &str = "hostname";

const HEADER_LEN: usize = 32;

/// Build the 32-byte NUL-padded tagged-data header
fn tagged_header(typestring: &str) -> [u8; HEADER_LEN] {
    let text = format!("== {}: type0 ==", typestring);
    debug_assert!(text.len() <= HEADER_LEN, "typestring too long for header");

    let mut header = [0u8; HEADER_LEN];
    header[..text.len()].copy_from_slice(text.as_bytes());
    header
}

fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.flush()?;
    file.sync_all()
}

/// Write the secret key file: header + 64-byte expanded secret (96 bytes)
pub fn write_secret_key(path: &Path, expanded: &[u8; 64]) -> io::Result<()> {
    let mut contents = Vec::with_capacity(HEADER_LEN + 64);
    contents.extend_from_slice(&tagged_header(SECRET_TAG));
    contents.extend_from_slice(expanded);
    write_file(path, &contents)
}

/// Write the public key file: header + 32-byte public key (64 bytes)
pub fn write_public_key(path: &Path, public: &[u8; 32]) -> io::Result<()> {
    let mut contents = Vec::with_capacity(HEADER_LEN + 32);
    contents.extend_from_slice(&tagged_header(PUBLIC_TAG));
    contents.extend_from_slice(public);
    write_file(path, &contents)
}

/// Write the hostname file: "<address>.onion" and a trailing newline
pub fn write_hostname(path: &Path, onion_address: &str) -> io::Result<()> {
    write_file(path, format!("{}.onion\n", onion_address).as_bytes())
}

/// Write the full key set into `dir`, in Tor's file layout
///
/// Writes secret key, public key, then hostname; the first failure
/// aborts the remaining writes. Partially written files are left in
/// place for the operator to inspect.
pub fn write_key_set(
    dir: &Path,
    public: &[u8; 32],
    expanded: &[u8; 64],
    onion_address: &str,
) -> io::Result<()> {
    write_secret_key(&dir.join(SECRET_KEY_FILE), expanded)?;
    write_public_key(&dir.join(PUBLIC_KEY_FILE), public)?;
    write_hostname(&dir.join(HOSTNAME_FILE), onion_address)
}
