//! Wallet accounts
//!
//! [`BlockFactory`] builds signed blocks from an account state,
//! [`LocalAccount`] tracks one account's committed and pending state, and
//! [`NetworkAccount`] publishes through a ledger collaborator with retry.

pub mod factory;
pub mod local;
pub mod synced;

pub use factory::BlockFactory;
pub use local::{LocalAccount, PendingState};
pub use synced::{NetworkAccount, SyncStatus, DEFAULT_RECEIVE_BATCH_SIZE};
