//! Error handling for the wallet engine
//!
//! Every failure in the crate is a [`NanoError`]. Local format problems,
//! business-rule violations raised while building a block, and failures
//! reported by the ledger collaborator are kept in separate variants so
//! callers (and the publish retry loop) can tell them apart.

use thiserror::Error;

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, NanoError>;

/// Business-rule violations raised while producing a block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    /// The account has no blocks yet, so it cannot send or change representative
    #[error("account is not opened")]
    NotOpened,
    /// The requested amount exceeds the current balance
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u128, available: u128 },
    /// Receiving the amount would exceed the maximum representable balance
    #[error("balance overflow: receiving {amount} on top of {balance}")]
    BalanceOverflow { balance: u128, amount: u128 },
    /// The work generator failed to produce a solution
    #[error("failed to generate work: {0}")]
    Work(String),
}

/// Error type for all wallet operations
#[derive(Debug, Clone, Error)]
pub enum NanoError {
    /// Malformed hex, address, checksum, length or amount
    #[error("Format error: {0}")]
    Format(String),
    /// A block could not be created
    #[error("Block creation failed: {0}")]
    Creation(#[from] CreationError),
    /// The ledger collaborator could not be reached or answered garbage
    #[error("Network error: {0}")]
    Network(String),
    /// The ledger rejected a block for a reason that is not retried
    #[error("Block rejected by the network: {0}")]
    Rejected(String),
    /// Every publish attempt hit a stale previous block
    #[error(
        "Block was rejected {attempts} times ({reason}); the account may be in use concurrently elsewhere"
    )]
    ConcurrentUse { attempts: u32, reason: String },
    /// `commit` was called without a pending transaction
    #[error("No pending transaction to commit")]
    NoPendingTransaction,
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
    /// Randomness or key material errors
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl NanoError {
    pub fn format(msg: impl Into<String>) -> Self {
        NanoError::Format(msg.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, NanoError::Format(_))
    }

    pub fn is_creation(&self) -> bool {
        matches!(self, NanoError::Creation(_))
    }

    /// The creation error behind this failure, if there is one
    pub fn creation(&self) -> Option<&CreationError> {
        match self {
            NanoError::Creation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NanoError {
    fn from(err: std::io::Error) -> Self {
        NanoError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NanoError {
    fn from(err: serde_json::Error) -> Self {
        NanoError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for NanoError {
    fn from(err: toml::de::Error) -> Self {
        NanoError::Config(err.to_string())
    }
}
