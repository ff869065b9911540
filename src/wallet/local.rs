use crate::core::{AccountState, Block, BlockAndState, BlockHash, NanoAccount, PrivateKey};
use crate::error::{NanoError, Result};
use crate::wallet::factory::BlockFactory;
use log::{debug, info};

/// Where the account is in the build/confirm cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    Idle,
    /// A block was built and is waiting for the caller to confirm it
    Pending { block: BlockHash, state: AccountState },
}

/// A single account whose chain position is tracked locally.
///
/// Every `create_*` call builds against the committed state and parks
/// the result as pending. Only `commit` makes it visible through
/// [`LocalAccount::state`], so the wallet never moves ahead of a block
/// the network has not accepted yet.
#[derive(Debug)]
pub struct LocalAccount {
    key: PrivateKey,
    account: NanoAccount,
    factory: BlockFactory,
    state: AccountState,
    pending: PendingState,
}

impl LocalAccount {
    pub fn new(key: PrivateKey, factory: BlockFactory, state: AccountState) -> Result<LocalAccount> {
        let account = factory.account_for(&key)?;
        Ok(LocalAccount {
            key,
            account,
            factory,
            state,
            pending: PendingState::Idle,
        })
    }

    pub fn account(&self) -> &NanoAccount {
        &self.account
    }

    pub fn factory(&self) -> &BlockFactory {
        &self.factory
    }

    /// The last committed state
    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        matches!(self.pending, PendingState::Pending { .. })
    }

    pub fn create_send(&mut self, destination: &NanoAccount, amount: u128) -> Result<Block> {
        let result = self.factory.send(&self.key, &self.state, destination, amount)?;
        Ok(self.park(result))
    }

    pub fn create_send_all(&mut self, destination: &NanoAccount) -> Result<Option<Block>> {
        let result = self.factory.send_all(&self.key, &self.state, destination)?;
        Ok(result.map(|r| self.park(r)))
    }

    pub fn create_receive(&mut self, source: &BlockHash, amount: u128) -> Result<Block> {
        let result = self.factory.receive(&self.key, &self.state, source, amount)?;
        Ok(self.park(result))
    }

    pub fn create_change_representative(
        &mut self,
        representative: &NanoAccount,
    ) -> Result<Option<Block>> {
        let result = self
            .factory
            .change_representative(&self.key, &self.state, representative)?;
        Ok(result.map(|r| self.park(r)))
    }

    /// Promote the pending state once its block has been accepted
    pub fn commit(&mut self) -> Result<&AccountState> {
        match std::mem::replace(&mut self.pending, PendingState::Idle) {
            PendingState::Idle => Err(NanoError::NoPendingTransaction),
            PendingState::Pending { block, state } => {
                info!("Committed block {block} for {}", self.account);
                self.state = state;
                Ok(&self.state)
            }
        }
    }

    /// Drop the pending block without touching the committed state
    pub fn discard_pending(&mut self) {
        if let PendingState::Pending { block, .. } = &self.pending {
            debug!("Discarding pending block {block} for {}", self.account);
        }
        self.pending = PendingState::Idle;
    }

    /// Replace the committed state, discarding anything pending
    pub fn update_state(&mut self, state: AccountState) {
        self.discard_pending();
        self.state = state;
    }

    fn park(&mut self, result: BlockAndState) -> Block {
        let (block, state) = result.into_parts();
        if self.has_pending() {
            debug!("Replacing uncommitted block for {}", self.account);
        }
        self.pending = PendingState::Pending {
            block: *block.hash(),
            state,
        };
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;
    use crate::wallet::factory::test_support::CountingWork;
    use std::sync::Arc;

    fn local(state: AccountState) -> LocalAccount {
        let factory = BlockFactory::new(Arc::new(CountingWork::default()), representative());
        LocalAccount::new(private_key(), factory, state).unwrap()
    }

    #[test]
    fn test_state_hidden_until_commit() {
        let mut wallet = local(AccountState::new(previous(), 100, representative()));
        let block = wallet.create_send(&representative(), 30).unwrap();

        assert_eq!(wallet.state().balance(), 100);
        assert!(wallet.has_pending());

        let committed = wallet.commit().unwrap().clone();
        assert_eq!(committed.balance(), 70);
        assert_eq!(committed.frontier(), Some(block.hash()));
        assert_eq!(wallet.pending(), &PendingState::Idle);
    }

    #[test]
    fn test_commit_while_idle_fails() {
        let mut wallet = local(AccountState::UNOPENED);
        assert!(matches!(wallet.commit(), Err(NanoError::NoPendingTransaction)));
    }

    #[test]
    fn test_update_state_discards_pending() {
        let mut wallet = local(AccountState::UNOPENED);
        wallet.create_receive(&previous(), 10).unwrap();
        assert!(wallet.has_pending());

        let fresh = AccountState::new(previous(), 55, account());
        wallet.update_state(fresh.clone());
        assert_eq!(wallet.state(), &fresh);
        assert!(!wallet.has_pending());
        assert!(wallet.commit().is_err());
    }

    #[test]
    fn test_chained_blocks_follow_committed_frontier() {
        let mut wallet = local(AccountState::UNOPENED);
        let open = wallet.create_receive(&previous(), 10).unwrap();
        wallet.commit().unwrap();
        let receive = wallet.create_receive(&previous(), 5).unwrap();
        wallet.commit().unwrap();

        assert!(open.is_opening());
        assert_eq!(receive.previous(), Some(open.hash()));
        assert_eq!(wallet.state().balance(), 15);
    }

    #[test]
    fn test_no_block_leaves_nothing_pending() {
        let mut wallet = local(AccountState::new(previous(), 0, representative()));
        assert!(wallet.create_send_all(&account()).unwrap().is_none());
        assert!(wallet
            .create_change_representative(&representative())
            .unwrap()
            .is_none());
        assert!(!wallet.has_pending());
    }

    #[test]
    fn test_failed_creation_keeps_previous_pending() {
        let mut wallet = local(AccountState::new(previous(), 10, representative()));
        wallet.create_send(&account(), 1).unwrap();
        assert!(wallet.create_send(&account(), 11).is_err());
        assert!(wallet.has_pending());
        assert_eq!(wallet.commit().unwrap().balance(), 9);
    }
}
