//! Legacy block variants
//!
//! The network no longer accepts new legacy blocks, but they still sit in
//! old account chains, so they must parse, hash and verify exactly.

use crate::core::account::NanoAccount;
use crate::core::block::{balance_to_hex, hash_fields, parse_hex_balance, BlockType};
use crate::core::bytes::{BlockHash, PrivateKey, Signature};
use crate::core::work::WorkSolution;
use crate::error::{NanoError, Result};
use serde::{Deserialize, Serialize, Serializer};

fn parse_wire<'a, T: Deserialize<'a>>(value: &'a serde_json::Value, block_type: BlockType) -> Result<T> {
    T::deserialize(value)
        .map_err(|e| NanoError::format(format!("invalid {block_type} block: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendBlock {
    previous: BlockHash,
    destination: NanoAccount,
    balance: u128,
    hash: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl SendBlock {
    pub fn new(
        previous: BlockHash,
        destination: NanoAccount,
        balance: u128,
        signature: Signature,
        work: WorkSolution,
    ) -> SendBlock {
        let hash = Self::compute_hash(&previous, &destination, balance);
        SendBlock {
            previous,
            destination,
            balance,
            hash,
            signature,
            work,
        }
    }

    pub fn sign(
        previous: BlockHash,
        destination: NanoAccount,
        balance: u128,
        key: &PrivateKey,
        work: WorkSolution,
    ) -> SendBlock {
        let hash = Self::compute_hash(&previous, &destination, balance);
        let signature = key.sign(&[hash.as_bytes()]);
        SendBlock {
            previous,
            destination,
            balance,
            hash,
            signature,
            work,
        }
    }

    fn compute_hash(previous: &BlockHash, destination: &NanoAccount, balance: u128) -> BlockHash {
        hash_fields(&[
            previous.as_bytes(),
            destination.public_key().as_bytes(),
            &balance.to_be_bytes(),
        ])
    }

    pub fn previous(&self) -> &BlockHash {
        &self.previous
    }

    pub fn destination(&self) -> &NanoAccount {
        &self.destination
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> &WorkSolution {
        &self.work
    }

    pub fn hashable_bytes(&self) -> Vec<u8> {
        [
            self.previous.as_bytes().as_slice(),
            self.destination.public_key().as_bytes(),
            &self.balance.to_be_bytes(),
        ]
        .concat()
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<SendBlock> {
        let wire: SendBlockWire = parse_wire(value, BlockType::Send)?;
        Ok(SendBlock::new(
            wire.previous,
            wire.destination,
            parse_hex_balance(&wire.balance)?,
            wire.signature,
            wire.work,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct SendBlockWire {
    previous: BlockHash,
    destination: NanoAccount,
    balance: String,
    signature: Signature,
    work: WorkSolution,
}

impl Serialize for SendBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Tagged {
            block_type: BlockType::Send.name(),
            fields: SendBlockWire {
                previous: self.previous,
                destination: self.destination.clone(),
                balance: balance_to_hex(self.balance),
                signature: self.signature,
                work: self.work,
            },
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveBlock {
    previous: BlockHash,
    source: BlockHash,
    hash: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl ReceiveBlock {
    pub fn new(
        previous: BlockHash,
        source: BlockHash,
        signature: Signature,
        work: WorkSolution,
    ) -> ReceiveBlock {
        let hash = hash_fields(&[previous.as_bytes(), source.as_bytes()]);
        ReceiveBlock {
            previous,
            source,
            hash,
            signature,
            work,
        }
    }

    pub fn sign(
        previous: BlockHash,
        source: BlockHash,
        key: &PrivateKey,
        work: WorkSolution,
    ) -> ReceiveBlock {
        let hash = hash_fields(&[previous.as_bytes(), source.as_bytes()]);
        let signature = key.sign(&[hash.as_bytes()]);
        ReceiveBlock {
            previous,
            source,
            hash,
            signature,
            work,
        }
    }

    pub fn previous(&self) -> &BlockHash {
        &self.previous
    }

    pub fn source(&self) -> &BlockHash {
        &self.source
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> &WorkSolution {
        &self.work
    }

    pub fn hashable_bytes(&self) -> Vec<u8> {
        [self.previous.as_bytes().as_slice(), self.source.as_bytes()].concat()
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<ReceiveBlock> {
        let wire: ReceiveBlockWire = parse_wire(value, BlockType::Receive)?;
        Ok(ReceiveBlock::new(
            wire.previous,
            wire.source,
            wire.signature,
            wire.work,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct ReceiveBlockWire {
    previous: BlockHash,
    source: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl Serialize for ReceiveBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Tagged {
            block_type: BlockType::Receive.name(),
            fields: ReceiveBlockWire {
                previous: self.previous,
                source: self.source,
                signature: self.signature,
                work: self.work,
            },
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    source: BlockHash,
    representative: NanoAccount,
    account: NanoAccount,
    hash: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl OpenBlock {
    pub fn new(
        source: BlockHash,
        representative: NanoAccount,
        account: NanoAccount,
        signature: Signature,
        work: WorkSolution,
    ) -> OpenBlock {
        let hash = Self::compute_hash(&source, &representative, &account);
        OpenBlock {
            source,
            representative,
            account,
            hash,
            signature,
            work,
        }
    }

    /// Sign as `account`; fails if `key` is not that account's key
    pub fn sign(
        source: BlockHash,
        representative: NanoAccount,
        account: NanoAccount,
        key: &PrivateKey,
        work: WorkSolution,
    ) -> Result<OpenBlock> {
        if key.public_key() != *account.public_key() {
            return Err(NanoError::Crypto(format!(
                "signing key does not belong to {account}"
            )));
        }
        let hash = Self::compute_hash(&source, &representative, &account);
        let signature = key.sign(&[hash.as_bytes()]);
        Ok(OpenBlock {
            source,
            representative,
            account,
            hash,
            signature,
            work,
        })
    }

    fn compute_hash(
        source: &BlockHash,
        representative: &NanoAccount,
        account: &NanoAccount,
    ) -> BlockHash {
        hash_fields(&[
            source.as_bytes(),
            representative.public_key().as_bytes(),
            account.public_key().as_bytes(),
        ])
    }

    pub fn source(&self) -> &BlockHash {
        &self.source
    }

    pub fn representative(&self) -> &NanoAccount {
        &self.representative
    }

    pub fn account(&self) -> &NanoAccount {
        &self.account
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> &WorkSolution {
        &self.work
    }

    pub fn hashable_bytes(&self) -> Vec<u8> {
        [
            self.source.as_bytes().as_slice(),
            self.representative.public_key().as_bytes(),
            self.account.public_key().as_bytes(),
        ]
        .concat()
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<OpenBlock> {
        let wire: OpenBlockWire = parse_wire(value, BlockType::Open)?;
        Ok(OpenBlock::new(
            wire.source,
            wire.representative,
            wire.account,
            wire.signature,
            wire.work,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct OpenBlockWire {
    source: BlockHash,
    representative: NanoAccount,
    account: NanoAccount,
    signature: Signature,
    work: WorkSolution,
}

impl Serialize for OpenBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Tagged {
            block_type: BlockType::Open.name(),
            fields: OpenBlockWire {
                source: self.source,
                representative: self.representative.clone(),
                account: self.account.clone(),
                signature: self.signature,
                work: self.work,
            },
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBlock {
    previous: BlockHash,
    representative: NanoAccount,
    hash: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl ChangeBlock {
    pub fn new(
        previous: BlockHash,
        representative: NanoAccount,
        signature: Signature,
        work: WorkSolution,
    ) -> ChangeBlock {
        let hash = hash_fields(&[previous.as_bytes(), representative.public_key().as_bytes()]);
        ChangeBlock {
            previous,
            representative,
            hash,
            signature,
            work,
        }
    }

    pub fn sign(
        previous: BlockHash,
        representative: NanoAccount,
        key: &PrivateKey,
        work: WorkSolution,
    ) -> ChangeBlock {
        let hash = hash_fields(&[previous.as_bytes(), representative.public_key().as_bytes()]);
        let signature = key.sign(&[hash.as_bytes()]);
        ChangeBlock {
            previous,
            representative,
            hash,
            signature,
            work,
        }
    }

    pub fn previous(&self) -> &BlockHash {
        &self.previous
    }

    pub fn representative(&self) -> &NanoAccount {
        &self.representative
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> &WorkSolution {
        &self.work
    }

    pub fn hashable_bytes(&self) -> Vec<u8> {
        [
            self.previous.as_bytes().as_slice(),
            self.representative.public_key().as_bytes(),
        ]
        .concat()
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<ChangeBlock> {
        let wire: ChangeBlockWire = parse_wire(value, BlockType::Change)?;
        Ok(ChangeBlock::new(
            wire.previous,
            wire.representative,
            wire.signature,
            wire.work,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct ChangeBlockWire {
    previous: BlockHash,
    representative: NanoAccount,
    signature: Signature,
    work: WorkSolution,
}

impl Serialize for ChangeBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Tagged {
            block_type: BlockType::Change.name(),
            fields: ChangeBlockWire {
                previous: self.previous,
                representative: self.representative.clone(),
                signature: self.signature,
                work: self.work,
            },
        }
        .serialize(serializer)
    }
}

/// Prepends the `type` field to a variant's wire fields
#[derive(Serialize)]
struct Tagged<T> {
    #[serde(rename = "type")]
    block_type: &'static str,
    #[serde(flatten)]
    fields: T,
}
