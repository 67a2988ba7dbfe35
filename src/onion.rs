//! Tor v3 onion address derivation and prefix matching

use sha3::{Digest, Sha3_256};

/// Version byte of a v3 onion address
pub const VERSION: u8 = 3;

const CHECKSUM_PREFIX: &[u8] = b".onion checksum";

/// Derive the v3 onion address for an Ed25519 public key
///
/// The address is base32(pubkey || checksum || version), lowercase and
/// without the ".onion" suffix, where
/// checksum = SHA3-256(".onion checksum" || pubkey || version)[0..2]
/// and version = 0x03. Always 56 characters from the [a-z2-7] alphabet.
pub fn onion_address(public: &[u8; 32]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(CHECKSUM_PREFIX);
    hasher.update(public);
    hasher.update([VERSION]);

    let mut payload = [0u8; 35];
    payload[..32].copy_from_slice(public);
    payload[32..34].copy_from_slice(&hasher.finalize()[..2]);
    payload[34] = VERSION;

    base32::encode(base32::Alphabet::Rfc4648Lower { padding: false }, &payload)
}

/// Byte-exact prefix test against a derived address
///
/// The address side is already lowercase; the prefix is compared as
/// typed. A prefix with uppercase letters or characters outside
/// [a-z2-7] can therefore never match.
pub fn matches_prefix(address: &str, prefix: &str) -> bool {
    address.as_bytes().starts_with(prefix.as_bytes())
}
