//! Core ledger types
//!
//! Accounts, fixed-width keys and hashes, the block variants, work values
//! and the immutable account state the wallet advances.

pub mod account;
pub mod account_state;
pub mod block;
pub mod bytes;
pub mod work;

pub use account::{NanoAccount, DEFAULT_PREFIX};
pub use account_state::{AccountState, BlockAndState};
pub use block::{
    Block, BlockDeserializer, BlockParser, BlockType, ChangeBlock, OpenBlock, ReceiveBlock,
    SendBlock, StateBlock, StateBlockBuilder, StateBlockSubtype, MAX_BALANCE,
};
pub use bytes::{BlockHash, Link, PrivateKey, PublicKey, Signature, WorkRoot};
pub use work::{WorkGenerator, WorkSolution, RECEIVE_THRESHOLD, SEND_THRESHOLD};
