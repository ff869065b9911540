//! Block model
//!
//! Five block variants share a hash, a signature and a work nonce. The
//! hash is Blake2b-256 over a fixed per-variant field layout (never the
//! signature or the work) and is computed once, when the block is built.
//!
//! | Variant | Hashed fields |
//! |---|---|
//! | send (legacy) | previous, destination key, balance |
//! | receive (legacy) | previous, source |
//! | open (legacy) | source, representative key, account key |
//! | change (legacy) | previous, representative key |
//! | state | preamble, account key, previous, representative key, balance, link |

pub mod deserializer;
pub mod legacy;
pub mod state;

pub use deserializer::{BlockDeserializer, BlockParser};
pub use legacy::{ChangeBlock, OpenBlock, ReceiveBlock, SendBlock};
pub use state::{StateBlock, StateBlockBuilder, StateBlockSubtype, STATE_BLOCK_PREAMBLE};

use crate::core::account::NanoAccount;
use crate::core::bytes::{BlockHash, PublicKey, Signature, WorkRoot};
use crate::core::work::WorkSolution;
use crate::error::{NanoError, Result};
use crate::utils::blake2b_256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest balance the protocol can represent
pub const MAX_BALANCE: u128 = u128::MAX;

/// Width of a balance in hashed and legacy wire form
pub const BALANCE_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Send,
    Receive,
    Open,
    Change,
    State,
}

impl BlockType {
    pub const ALL: [BlockType; 5] = [
        BlockType::Send,
        BlockType::Receive,
        BlockType::Open,
        BlockType::Change,
        BlockType::State,
    ];

    /// The lowercase name used in the `type` field
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Send => "send",
            BlockType::Receive => "receive",
            BlockType::Open => "open",
            BlockType::Change => "change",
            BlockType::State => "state",
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, BlockType::State)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = NanoError;

    fn from_str(s: &str) -> Result<Self> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| NanoError::format(format!("unrecognized block type '{s}'")))
    }
}

/// Blake2b-256 of a canonical byte layout
pub(crate) fn hash_fields(fields: &[&[u8]]) -> BlockHash {
    BlockHash::new(blake2b_256(fields))
}

pub(crate) fn parse_decimal_balance(text: &str) -> Result<u128> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NanoError::format(format!("invalid decimal balance '{text}'")));
    }
    text.parse::<u128>()
        .map_err(|e| NanoError::format(format!("balance '{text}' out of range: {e}")))
}

pub(crate) fn parse_hex_balance(text: &str) -> Result<u128> {
    let bytes = crate::core::bytes::decode_hex_array::<BALANCE_LEN>(text, "balance")?;
    Ok(u128::from_be_bytes(bytes))
}

pub(crate) fn balance_to_hex(balance: u128) -> String {
    data_encoding::HEXUPPER.encode(&balance.to_be_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
            Block::State(_) => BlockType::State,
        }
    }

    pub fn hash(&self) -> &BlockHash {
        match self {
            Block::Send(b) => b.hash(),
            Block::Receive(b) => b.hash(),
            Block::Open(b) => b.hash(),
            Block::Change(b) => b.hash(),
            Block::State(b) => b.hash(),
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Block::Send(b) => b.signature(),
            Block::Receive(b) => b.signature(),
            Block::Open(b) => b.signature(),
            Block::Change(b) => b.signature(),
            Block::State(b) => b.signature(),
        }
    }

    pub fn work(&self) -> &WorkSolution {
        match self {
            Block::Send(b) => b.work(),
            Block::Receive(b) => b.work(),
            Block::Open(b) => b.work(),
            Block::Change(b) => b.work(),
            Block::State(b) => b.work(),
        }
    }

    /// The exact bytes the hash is computed over
    pub fn hashable_bytes(&self) -> Vec<u8> {
        match self {
            Block::Send(b) => b.hashable_bytes(),
            Block::Receive(b) => b.hashable_bytes(),
            Block::Open(b) => b.hashable_bytes(),
            Block::Change(b) => b.hashable_bytes(),
            Block::State(b) => b.hashable_bytes(),
        }
    }

    /// Previous block hash; `None` for a legacy open block. A state block
    /// opening its account reports the all-zero hash.
    pub fn previous(&self) -> Option<&BlockHash> {
        match self {
            Block::Send(b) => Some(b.previous()),
            Block::Receive(b) => Some(b.previous()),
            Block::Open(_) => None,
            Block::Change(b) => Some(b.previous()),
            Block::State(b) => Some(b.previous()),
        }
    }

    /// The owning account, for variants that carry it
    pub fn account(&self) -> Option<&NanoAccount> {
        match self {
            Block::Open(b) => Some(b.account()),
            Block::State(b) => Some(b.account()),
            _ => None,
        }
    }

    pub fn account_key(&self) -> Option<&PublicKey> {
        self.account().map(NanoAccount::public_key)
    }

    pub fn representative(&self) -> Option<&NanoAccount> {
        match self {
            Block::Open(b) => Some(b.representative()),
            Block::Change(b) => Some(b.representative()),
            Block::State(b) => Some(b.representative()),
            _ => None,
        }
    }

    /// Balance after this block, for variants that record it
    pub fn balance(&self) -> Option<u128> {
        match self {
            Block::Send(b) => Some(b.balance()),
            Block::State(b) => Some(b.balance()),
            _ => None,
        }
    }

    /// True when this is the first block of its account
    pub fn is_opening(&self) -> bool {
        match self {
            Block::Open(_) => true,
            Block::State(b) => b.is_opening(),
            _ => false,
        }
    }

    /// The value work is computed against. Legacy blocks other than open
    /// do not carry the account key, so they always use `previous`.
    pub fn work_root(&self) -> WorkRoot {
        match self {
            Block::Send(b) => WorkRoot::from(*b.previous()),
            Block::Receive(b) => WorkRoot::from(*b.previous()),
            Block::Open(b) => WorkRoot::from(*b.account().public_key()),
            Block::Change(b) => WorkRoot::from(*b.previous()),
            Block::State(b) => b.work_root(),
        }
    }

    /// Check the signature against the hash with `signer`
    pub fn verify_signature(&self, signer: &PublicKey) -> bool {
        signer.verify(&[self.hash().as_bytes()], self.signature())
    }

    /// Check the signature against the embedded account, when there is one
    pub fn verify_own_signature(&self) -> Option<bool> {
        self.account_key().map(|key| self.verify_signature(key))
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Block::Send(b) => b.serialize(serializer),
            Block::Receive(b) => b.serialize(serializer),
            Block::Open(b) => b.serialize(serializer),
            Block::Change(b) => b.serialize(serializer),
            Block::State(b) => b.serialize(serializer),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} block {}", self.block_type(), self.hash())
    }
}

impl From<SendBlock> for Block {
    fn from(b: SendBlock) -> Self {
        Block::Send(b)
    }
}

impl From<ReceiveBlock> for Block {
    fn from(b: ReceiveBlock) -> Self {
        Block::Receive(b)
    }
}

impl From<OpenBlock> for Block {
    fn from(b: OpenBlock) -> Self {
        Block::Open(b)
    }
}

impl From<ChangeBlock> for Block {
    fn from(b: ChangeBlock) -> Self {
        Block::Change(b)
    }
}

impl From<StateBlock> for Block {
    fn from(b: StateBlock) -> Self {
        Block::State(b)
    }
}
