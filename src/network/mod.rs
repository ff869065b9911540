//! Ledger collaborator interface
//!
//! The wallet talks to a node only through [`LedgerNetwork`]; transports
//! live outside this crate.

pub mod ledger;
pub mod retry;

pub use ledger::{AccountInfo, BlockInfo, LedgerNetwork, ProcessResponse, Receivable};
pub use retry::{is_stale_reason, RejectionClassifier, RetryPolicy, STALE_REASONS};
