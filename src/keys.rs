//! Ed25519 key generation and Tor's expanded secret key form

use ed25519_dalek::SigningKey;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

/// A candidate keypair produced during the search
///
/// The seed is kept alongside the public key because Tor stores the
/// secret in its SHA-512 expanded form, which is derived from the seed
/// rather than from the `SigningKey` itself.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub seed: [u8; 32],
    pub public: [u8; 32],
}

/// Generate a fresh keypair from the given CSPRNG
///
/// Uses the fallible fill so an exhausted or broken entropy source
/// surfaces as an error instead of a panic.
pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Candidate, rand::Error> {
    let mut seed = [0u8; 32];
    rng.try_fill_bytes(&mut seed)?;

    let signing_key = SigningKey::from_bytes(&seed);
    Ok(Candidate {
        seed,
        public: signing_key.verifying_key().to_bytes(),
    })
}

/// Expand a seed into the 64-byte secret key form Tor stores on disk
///
/// h = SHA-512(seed), then the scalar half is clamped:
/// h[0] &= 248, h[31] &= 127, h[31] |= 64. Tor keeps keys in this
/// expanded form because its key blinding cannot start from the seed.
pub fn expand_secret(seed: &[u8; 32]) -> [u8; 64] {
    let mut expanded = [0u8; 64];
    expanded.copy_from_slice(&Sha512::digest(seed));
    expanded[0] &= 248;
    expanded[31] &= 127;
    expanded[31] |= 64;
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_generate_is_random() {
        let a = generate(&mut OsRng).unwrap();
        let b = generate(&mut OsRng).unwrap();
        assert_ne!(a.seed, b.seed);
        assert_ne!(a.public, b.public);
    }

    #[test]
    fn test_public_key_from_zero_seed() {
        let signing_key = SigningKey::from_bytes(&[0u8; 32]);
        assert_eq!(
            hex::encode(signing_key.verifying_key().to_bytes()),
            "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
        );
    }

    #[test]
    fn test_expand_zero_seed() {
        assert_eq!(
            hex::encode(expand_secret(&[0u8; 32])),
            "5046adc1dba838867b2bbbfdd0c3423e58b57970b5267a90f57960924a87f156\
             0a6a85eaa642dac835424b5d7c8d637c00408c7a73da672b7f498521420b6dd3"
        );
    }

    #[test]
    fn test_seed_to_address_pipeline() {
        let signing_key = SigningKey::from_bytes(&[42u8; 32]);
        let address = crate::onion::onion_address(&signing_key.verifying_key().to_bytes());
        assert_eq!(
            address,
            "df7wwi7bnsctfrvlza4pvtk6u6e34ddwwkjagnadtp5iwpjwrvq5bpad"
        );
    }

    #[test]
    fn test_clamping_invariants() {
        for _ in 0..32 {
            let candidate = generate(&mut OsRng).unwrap();
            let expanded = expand_secret(&candidate.seed);
            assert_eq!(expanded[0] & 0x07, 0);
            assert_eq!(expanded[31] & 0x80, 0);
            assert_eq!(expanded[31] & 0x40, 0x40);
        }
    }
}
