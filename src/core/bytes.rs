//! Fixed-width byte values
//!
//! Keys, hashes and signatures are plain value types compared by content.
//! Their text form is uppercase hex; parsing accepts either case.

use crate::error::{NanoError, Result};
use crate::utils::{blake2b_256, ed25519, random_bytes32};
use data_encoding::{HEXUPPER, HEXUPPER_PERMISSIVE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Decode a hex string into exactly `N` bytes
pub(crate) fn decode_hex_array<const N: usize>(text: &str, what: &str) -> Result<[u8; N]> {
    if text.len() != N * 2 {
        return Err(NanoError::format(format!(
            "{what} must be {} hex characters, got {}",
            N * 2,
            text.len()
        )));
    }
    let bytes = HEXUPPER_PERMISSIVE
        .decode(text.as_bytes())
        .map_err(|e| NanoError::format(format!("invalid hex in {what}: {e}")))?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            pub const fn zero() -> Self {
                $name([0u8; $len])
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| {
                    NanoError::format(format!(
                        "{} must be {} bytes, got {}",
                        $what,
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok($name(array))
            }

            pub fn from_hex(text: &str) -> Result<Self> {
                decode_hex_array::<$len>(text, $what).map($name)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_bytes(self) -> [u8; $len] {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn to_hex(&self) -> String {
                HEXUPPER.encode(&self.0)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl FromStr for $name {
            type Err = NanoError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::from_hex(&text).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 32-byte Ed25519/Blake2b public key
    PublicKey,
    32,
    "public key"
);

fixed_bytes!(
    /// A 32-byte block hash
    BlockHash,
    32,
    "block hash"
);

fixed_bytes!(
    /// A 64-byte block signature
    Signature,
    64,
    "signature"
);

fixed_bytes!(
    /// The raw 32-byte link field of a state block
    Link,
    32,
    "link"
);

fixed_bytes!(
    /// The value proof-of-work is computed against: the previous block
    /// hash, or the account key for an account's first block
    WorkRoot,
    32,
    "work root"
);

impl PublicKey {
    /// Check `signature` over the concatenation of `data`
    pub fn verify(&self, data: &[&[u8]], signature: &Signature) -> bool {
        ed25519::verify(&self.0, data, signature.as_bytes())
    }
}

impl From<PublicKey> for Link {
    fn from(key: PublicKey) -> Self {
        Link(key.0)
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Link(hash.0)
    }
}

impl From<PublicKey> for WorkRoot {
    fn from(key: PublicKey) -> Self {
        WorkRoot(key.0)
    }
}

impl From<BlockHash> for WorkRoot {
    fn from(hash: BlockHash) -> Self {
        WorkRoot(hash.0)
    }
}

impl Link {
    pub fn as_public_key(&self) -> PublicKey {
        PublicKey(self.0)
    }

    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash(self.0)
    }
}

/// A 32-byte private key; wiped from memory on drop and never printed
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn new(bytes: [u8; 32]) -> PrivateKey {
        PrivateKey(bytes)
    }

    /// A fresh key from the system CSPRNG
    pub fn generate() -> Result<PrivateKey> {
        random_bytes32().map(PrivateKey)
    }

    /// Deterministic key number `index` of a 32-byte seed:
    /// Blake2b-256(seed || index as big-endian u32)
    pub fn from_seed(seed: &[u8; 32], index: u32) -> PrivateKey {
        PrivateKey(blake2b_256(&[seed.as_slice(), &index.to_be_bytes()]))
    }

    pub fn from_hex(text: &str) -> Result<PrivateKey> {
        decode_hex_array::<32>(text, "private key").map(PrivateKey)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Uppercase hex of the secret; callers must treat the result as sensitive
    pub fn to_hex(&self) -> String {
        HEXUPPER.encode(&self.0)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(ed25519::derive_public_key(&self.0))
    }

    /// Sign the concatenation of `data`
    pub fn sign(&self, data: &[&[u8]]) -> Signature {
        Signature(ed25519::sign(&self.0, data))
    }
}

impl FromStr for PrivateKey {
    type Err = NanoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
