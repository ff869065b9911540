use crate::core::{AccountState, Block, BlockHash, NanoAccount};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What the ledger knows about an opened account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub frontier: BlockHash,
    pub balance: u128,
    pub representative: NanoAccount,
}

impl AccountInfo {
    /// Account state for a snapshot lookup; an unknown account is unopened
    pub fn into_state(snapshot: Option<AccountInfo>) -> AccountState {
        match snapshot {
            Some(info) => {
                AccountState::from_ledger(Some(info.frontier), info.balance, Some(info.representative))
            }
            None => AccountState::UNOPENED,
        }
    }
}

impl From<AccountInfo> for AccountState {
    fn from(info: AccountInfo) -> Self {
        AccountState::new(info.frontier, info.balance, info.representative)
    }
}

/// A published block as the ledger reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Amount moved by the block, when it moves funds
    pub amount: Option<u128>,
    pub confirmed: bool,
    pub contents: Block,
}

/// A send waiting to be received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receivable {
    pub hash: BlockHash,
    pub amount: u128,
    pub source: Option<NanoAccount>,
}

/// Outcome of submitting a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResponse {
    Accepted(BlockHash),
    /// The node refused the block; the text is its reason verbatim
    Rejected(String),
}

/// The remote ledger. Transport failures are `Err`; a block the node
/// refuses is `Ok(ProcessResponse::Rejected)`.
pub trait LedgerNetwork: Send + Sync {
    /// `None` when the ledger has never seen the account
    fn account_info(&self, account: &NanoAccount) -> Result<Option<AccountInfo>>;

    fn block_info(&self, hash: &BlockHash) -> Result<Option<BlockInfo>>;

    /// Up to `count` receivable sends of at least `threshold` raw, in the
    /// order the node returns them
    fn pending(
        &self,
        account: &NanoAccount,
        count: usize,
        threshold: u128,
    ) -> Result<Vec<Receivable>>;

    fn process(&self, block: &Block) -> Result<ProcessResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;

    #[test]
    fn test_snapshot_mapping() {
        assert_eq!(AccountInfo::into_state(None), AccountState::UNOPENED);

        let info = AccountInfo {
            frontier: previous(),
            balance: BALANCE,
            representative: representative(),
        };
        let state = AccountInfo::into_state(Some(info.clone()));
        assert!(state.is_opened());
        assert_eq!(state.balance(), BALANCE);
        assert_eq!(state, AccountState::from(info));
    }
}
