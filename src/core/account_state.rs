use crate::core::account::NanoAccount;
use crate::core::block::Block;
use crate::core::bytes::BlockHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account's chain position: frontier, balance and representative.
///
/// Values are never mutated; every change produces a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    frontier: Option<BlockHash>,
    balance: u128,
    representative: Option<NanoAccount>,
}

impl AccountState {
    /// An account that has never published a block
    pub const UNOPENED: AccountState = AccountState {
        frontier: None,
        balance: 0,
        representative: None,
    };

    pub fn new(frontier: BlockHash, balance: u128, representative: NanoAccount) -> AccountState {
        AccountState {
            frontier: Some(frontier),
            balance,
            representative: Some(representative),
        }
    }

    /// Map a ledger snapshot; an account without a frontier is unopened
    /// whatever the other fields say
    pub fn from_ledger(
        frontier: Option<BlockHash>,
        balance: u128,
        representative: Option<NanoAccount>,
    ) -> AccountState {
        match frontier {
            None => AccountState::UNOPENED,
            Some(frontier) => AccountState {
                frontier: Some(frontier),
                balance,
                representative,
            },
        }
    }

    pub fn is_opened(&self) -> bool {
        self.frontier.is_some()
    }

    pub fn frontier(&self) -> Option<&BlockHash> {
        self.frontier.as_ref()
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn representative(&self) -> Option<&NanoAccount> {
        self.representative.as_ref()
    }

    pub fn with_frontier(&self, frontier: BlockHash) -> AccountState {
        AccountState {
            frontier: Some(frontier),
            ..self.clone()
        }
    }

    pub fn with_balance(&self, balance: u128) -> AccountState {
        AccountState {
            balance,
            ..self.clone()
        }
    }

    pub fn with_representative(&self, representative: NanoAccount) -> AccountState {
        AccountState {
            representative: Some(representative),
            ..self.clone()
        }
    }
}

impl Default for AccountState {
    fn default() -> Self {
        AccountState::UNOPENED
    }
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.frontier, &self.representative) {
            (None, _) => write!(f, "unopened (balance {})", self.balance),
            (Some(frontier), Some(rep)) => write!(
                f,
                "frontier {frontier}, balance {}, representative {rep}",
                self.balance
            ),
            (Some(frontier), None) => {
                write!(f, "frontier {frontier}, balance {}", self.balance)
            }
        }
    }
}

/// A freshly built block together with the state it leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAndState {
    block: Block,
    state: AccountState,
}

impl BlockAndState {
    pub fn new(block: Block, state: AccountState) -> BlockAndState {
        BlockAndState { block, state }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn into_parts(self) -> (Block, AccountState) {
        (self.block, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;

    #[test]
    fn test_unopened_sentinel() {
        let state = AccountState::UNOPENED;
        assert!(!state.is_opened());
        assert_eq!(state.balance(), 0);
        assert!(state.frontier().is_none());
        assert!(state.representative().is_none());
        assert_eq!(AccountState::default(), state);
    }

    #[test]
    fn test_from_ledger_without_frontier_is_unopened() {
        let state = AccountState::from_ledger(None, 500, Some(representative()));
        assert_eq!(state, AccountState::UNOPENED);

        let state = AccountState::from_ledger(Some(previous()), 500, Some(representative()));
        assert!(state.is_opened());
        assert_eq!(state, AccountState::new(previous(), 500, representative()));
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let original = AccountState::new(previous(), 10, representative());
        let moved = original.with_balance(4).with_frontier(BlockHash::new([1; 32]));
        assert_eq!(original.balance(), 10);
        assert_eq!(moved.balance(), 4);
        assert_eq!(moved.frontier(), Some(&BlockHash::new([1; 32])));
        assert_eq!(moved.representative(), original.representative());

        let rep_changed = original.with_representative(account());
        assert_eq!(rep_changed.representative(), Some(&account()));
    }

    #[test]
    fn test_display() {
        assert_eq!(AccountState::UNOPENED.to_string(), "unopened (balance 0)");
        let state = AccountState::new(previous(), 7, representative());
        assert_eq!(
            state.to_string(),
            format!("frontier {PREVIOUS}, balance 7, representative {REPRESENTATIVE}")
        );
    }
}
