//! Utility functions and helpers
//!
//! This module contains the text codec used by account addresses, the
//! Blake2b hashing helpers, and the Ed25519/Blake2b signing engine.

pub mod codec;
pub mod crypto;
pub mod ed25519;

pub use codec::{BaseCodec, NANO_ALPHABET, NANO_BASE32};
pub use crypto::{
    blake2b_256, blake2b_40, blake2b_64, blake2b_digest, random_bytes32, DEFAULT_HASH_LEN,
};
