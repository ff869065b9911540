use crate::core::bytes::{decode_hex_array, WorkRoot};
use crate::error::{NanoError, Result};
use crate::utils::blake2b_64;
use data_encoding::{HEXLOWER, HEXUPPER};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minimum difficulty the network asks of send and change blocks
pub const SEND_THRESHOLD: u64 = 0xFFFF_FFF8_0000_0000;

/// Minimum difficulty the network asks of receive and open blocks
pub const RECEIVE_THRESHOLD: u64 = 0xFFFF_FE00_0000_0000;

/// An 8-byte proof-of-work nonce, stored big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorkSolution([u8; 8]);

impl WorkSolution {
    pub const fn new(bytes: [u8; 8]) -> WorkSolution {
        WorkSolution(bytes)
    }

    pub const fn from_u64(value: u64) -> WorkSolution {
        WorkSolution(value.to_be_bytes())
    }

    pub fn from_hex(text: &str) -> Result<WorkSolution> {
        decode_hex_array::<8>(text, "work").map(WorkSolution)
    }

    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        HEXUPPER.encode(&self.0)
    }

    /// Lowercase form the node uses on the wire
    pub fn to_wire(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    /// Difficulty of this nonce against `root`: the little-endian value of
    /// Blake2b-64(nonce as little-endian || root)
    pub fn difficulty(&self, root: &WorkRoot) -> u64 {
        let nonce = self.as_u64().to_le_bytes();
        u64::from_le_bytes(blake2b_64(&[nonce.as_slice(), root.as_bytes()]))
    }

    pub fn meets(&self, root: &WorkRoot, threshold: u64) -> bool {
        self.difficulty(root) >= threshold
    }
}

impl FromStr for WorkSolution {
    type Err = NanoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for WorkSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for WorkSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkSolution({})", self.to_wire())
    }
}

impl Serialize for WorkSolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for WorkSolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        WorkSolution::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Supplies proof-of-work for a root. Searching is the implementor's job
/// (a work server, a GPU, a remote peer); this crate only asks and checks.
pub trait WorkGenerator: Send + Sync {
    /// Produce a nonce for `root` whose difficulty is at least `threshold`
    fn generate(&self, root: &WorkRoot, threshold: u64) -> Result<WorkSolution>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> WorkRoot {
        WorkRoot::from_hex("8AF1B28DA06C9CA2466159428733B971068BF154DBA2AB10372510D52E86CC97")
            .unwrap()
    }

    #[test]
    fn test_hex_forms() {
        let work = WorkSolution::from_hex("7202DF8A7C380578").unwrap();
        assert_eq!(work.as_u64(), 0x7202_df8a_7c38_0578);
        assert_eq!(work.to_string(), "7202DF8A7C380578");
        assert_eq!(work.to_wire(), "7202df8a7c380578");
        assert_eq!(WorkSolution::from_u64(0x7202_df8a_7c38_0578), work);
    }

    #[test]
    fn test_difficulty_vector() {
        let work = WorkSolution::from_u64(0x7202_df8a_7c38_0578);
        assert_eq!(work.difficulty(&root()), 0x930e_c743_f055_437e);
        assert!(work.meets(&root(), 0x9000_0000_0000_0000));
        assert!(!work.meets(&root(), RECEIVE_THRESHOLD));
        assert!(!work.meets(&root(), SEND_THRESHOLD));
    }

    #[test]
    fn test_serde_is_lowercase_and_accepts_uppercase() {
        let work = WorkSolution::from_u64(0xABCD);
        assert_eq!(serde_json::to_string(&work).unwrap(), "\"000000000000abcd\"");
        let back: WorkSolution = serde_json::from_str("\"000000000000ABCD\"").unwrap();
        assert_eq!(back, work);
    }

    #[test]
    fn test_bad_work_text() {
        assert!(WorkSolution::from_hex("1234").unwrap_err().is_format());
    }
}
