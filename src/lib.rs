//! # nano-wallet
//!
//! A client-side engine for the Nano ledger. It rebuilds every protocol
//! invariant locally instead of trusting the node it talks to.
//!
//! ## What is here
//! - **Addresses**: base-32 account addresses with a Blake2b checksum
//! - **Signing**: Ed25519 with Blake2b-512 as its internal hash
//! - **Blocks**: the four legacy variants and the state block, each
//!   hashed over a fixed field layout, plus a JSON deserializer registry
//! - **Wallet accounts**: a block factory, a local two-phase
//!   (pending/commit) account, and a network-synchronized account that
//!   retries publishing when its view of the chain is stale
//!
//! ## Layout
//! - `core/`: keys, hashes, accounts, blocks, work values, account state
//! - `wallet/`: block factory, local and network-synchronized accounts
//! - `network/`: the ledger collaborator trait and retry policy
//! - `config/`: TOML and environment settings
//! - `utils/`: base-N codec, Blake2b helpers, Ed25519 engine
//! - `cli/`: arguments for the offline `nano-wallet` binary
//!
//! Transports and proof-of-work search are not part of this crate; bring
//! them in through [`LedgerNetwork`] and [`WorkGenerator`].

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;
pub mod wallet;

pub use cli::{Command, Opt};
pub use config::Settings;
pub use crate::core::{
    AccountState, Block, BlockAndState, BlockDeserializer, BlockHash, BlockType, ChangeBlock,
    Link, NanoAccount, OpenBlock, PrivateKey, PublicKey, ReceiveBlock, SendBlock, Signature,
    StateBlock, StateBlockBuilder, StateBlockSubtype, WorkGenerator, WorkRoot, WorkSolution,
    RECEIVE_THRESHOLD, SEND_THRESHOLD,
};
pub use error::{CreationError, NanoError, Result};
pub use network::{
    AccountInfo, BlockInfo, LedgerNetwork, ProcessResponse, Receivable, RetryPolicy,
};
pub use wallet::{BlockFactory, LocalAccount, NetworkAccount, PendingState, SyncStatus};
