//! Tor v3 vanity onion address and key generator
//!
//! Searches for Ed25519 keypairs whose derived v3 onion address starts
//! with a chosen prefix, then writes the winning keypair in the key-file
//! format a Tor hidden service expects (`hs_ed25519_secret_key`,
//! `hs_ed25519_public_key`, `hostname`).

pub mod keyfile;
pub mod keys;
pub mod onion;
pub mod search;

pub use onion::{matches_prefix, onion_address};
pub use search::{format_speed, Progress, SearchError, SearchOutcome, Searcher};
