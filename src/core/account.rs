//! Account identity
//!
//! An account is a public key plus the textual prefix used when printing
//! it. The address is `<prefix>_<52 symbols of key><8 symbols of checksum>`
//! where the checksum is the byte-reversed 5-byte Blake2b of the key.

use crate::core::bytes::PublicKey;
use crate::error::{NanoError, Result};
use crate::utils::{blake2b_40, NANO_BASE32};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PREFIX: &str = "nano";

const KEY_SYMBOLS: usize = 52;
const CHECKSUM_SYMBOLS: usize = 8;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NanoAccount {
    public_key: PublicKey,
    prefix: String,
}

impl NanoAccount {
    pub fn new(public_key: PublicKey, prefix: &str) -> Result<NanoAccount> {
        validate_prefix(prefix)?;
        Ok(NanoAccount {
            public_key,
            prefix: prefix.to_string(),
        })
    }

    /// Account with the default `nano` prefix
    pub fn from_public_key(public_key: PublicKey) -> NanoAccount {
        NanoAccount {
            public_key,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Parse either a full address or a 64-character hex public key.
    /// A bare key gets the default prefix.
    pub fn parse(text: &str) -> Result<NanoAccount> {
        if text.len() == PublicKey::LEN * 2 && !text.contains('_') {
            return PublicKey::from_hex(text).map(NanoAccount::from_public_key);
        }
        Self::parse_address(text)
    }

    /// Parse a bare key, assigning `prefix` to it
    pub fn parse_hex(text: &str, prefix: &str) -> Result<NanoAccount> {
        Self::new(PublicKey::from_hex(text)?, prefix)
    }

    /// Parse `<prefix>_<key><checksum>`, verifying the checksum
    pub fn parse_address(text: &str) -> Result<NanoAccount> {
        let (prefix, body) = text
            .rsplit_once('_')
            .ok_or_else(|| NanoError::format(format!("address has no prefix separator: {text}")))?;
        validate_prefix(prefix)?;

        if !body.is_ascii() || body.len() != KEY_SYMBOLS + CHECKSUM_SYMBOLS {
            return Err(NanoError::format(format!(
                "address body must be {} symbols, got {}",
                KEY_SYMBOLS + CHECKSUM_SYMBOLS,
                body.chars().count()
            )));
        }
        let (key_text, checksum_text) = body.split_at(KEY_SYMBOLS);

        let key_bytes = NANO_BASE32.decode_exact(key_text, PublicKey::LEN)?;
        let public_key = PublicKey::from_slice(&key_bytes)?;
        let given_checksum = NANO_BASE32.decode_exact(checksum_text, 5)?;
        if given_checksum != checksum_bytes(&public_key) {
            return Err(NanoError::format(format!("address checksum mismatch: {text}")));
        }

        Ok(NanoAccount {
            public_key,
            prefix: prefix.to_string(),
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The same key under another prefix
    pub fn with_prefix(&self, prefix: &str) -> Result<NanoAccount> {
        NanoAccount::new(self.public_key, prefix)
    }

    /// The 8-symbol encoded checksum
    pub fn checksum(&self) -> String {
        NANO_BASE32.encode(&checksum_bytes(&self.public_key))
    }

    pub fn address(&self) -> String {
        format!(
            "{}_{}{}",
            self.prefix,
            NANO_BASE32.encode(self.public_key.as_bytes()),
            self.checksum()
        )
    }

    pub fn to_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// True when both identities wrap the same key, whatever their prefixes
    pub fn equals_ignore_prefix(&self, other: &NanoAccount) -> bool {
        self.public_key == other.public_key
    }
}

fn checksum_bytes(public_key: &PublicKey) -> [u8; 5] {
    let mut digest = blake2b_40(&[public_key.as_bytes()]);
    digest.reverse();
    digest
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NanoError::format(format!(
            "address prefix must be non-empty and alphanumeric, got '{prefix}'"
        )));
    }
    Ok(())
}

impl From<PublicKey> for NanoAccount {
    fn from(public_key: PublicKey) -> Self {
        NanoAccount::from_public_key(public_key)
    }
}

impl FromStr for NanoAccount {
    type Err = NanoError;

    fn from_str(s: &str) -> Result<Self> {
        NanoAccount::parse(s)
    }
}

impl fmt::Display for NanoAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for NanoAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NanoAccount({})", self.address())
    }
}

impl Serialize for NanoAccount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.address())
    }
}

impl<'de> Deserialize<'de> for NanoAccount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NanoAccount::parse(&text).map_err(serde::de::Error::custom)
    }
}
