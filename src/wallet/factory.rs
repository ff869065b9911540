//! Block factory
//!
//! Turns an intent (send, receive, change representative) plus the current
//! [`AccountState`] into a signed state block and the state it leads to.
//! The factory holds no account state of its own.

use crate::core::{
    AccountState, Block, BlockAndState, BlockHash, Link, NanoAccount, PrivateKey, StateBlock,
    StateBlockSubtype, WorkGenerator, WorkRoot, WorkSolution, RECEIVE_THRESHOLD, SEND_THRESHOLD,
};
use crate::error::{CreationError, NanoError, Result};
use log::debug;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct BlockFactory {
    work: Arc<dyn WorkGenerator>,
    default_representative: NanoAccount,
    prefix: String,
}

impl BlockFactory {
    /// Accounts are addressed with the default representative's prefix
    /// unless [`BlockFactory::with_prefix`] says otherwise.
    pub fn new(work: Arc<dyn WorkGenerator>, default_representative: NanoAccount) -> BlockFactory {
        let prefix = default_representative.prefix().to_string();
        BlockFactory {
            work,
            default_representative,
            prefix,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Result<BlockFactory> {
        self.default_representative = self.default_representative.with_prefix(prefix)?;
        self.prefix = prefix.to_string();
        Ok(self)
    }

    pub fn default_representative(&self) -> &NanoAccount {
        &self.default_representative
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The account `key` signs for, under this factory's prefix
    pub fn account_for(&self, key: &PrivateKey) -> Result<NanoAccount> {
        NanoAccount::new(key.public_key(), &self.prefix)
    }

    /// Send `amount` raw to `destination`
    pub fn send(
        &self,
        key: &PrivateKey,
        state: &AccountState,
        destination: &NanoAccount,
        amount: u128,
    ) -> Result<BlockAndState> {
        if amount == 0 {
            return Err(NanoError::format("send amount must be greater than zero"));
        }
        let frontier = *state.frontier().ok_or(CreationError::NotOpened)?;
        if amount > state.balance() {
            return Err(CreationError::InsufficientFunds {
                required: amount,
                available: state.balance(),
            }
            .into());
        }

        let account = self.account_for(key)?;
        let representative = self.current_representative(state);
        let balance = state.balance() - amount;
        let work = self.work_for(WorkRoot::from(frontier), SEND_THRESHOLD)?;
        let block = StateBlock::builder()
            .subtype(StateBlockSubtype::Send)
            .account(account)
            .previous(frontier)
            .representative(representative.clone())
            .balance(balance)
            .link_account(destination.clone())
            .sign(key, work)?;
        debug!("Built send of {amount} raw to {destination}: {}", block.hash());
        Ok(self.finish(block, balance, representative))
    }

    /// Send the whole balance; `None` when there is nothing to send
    pub fn send_all(
        &self,
        key: &PrivateKey,
        state: &AccountState,
        destination: &NanoAccount,
    ) -> Result<Option<BlockAndState>> {
        if state.balance() == 0 {
            return Ok(None);
        }
        self.send(key, state, destination, state.balance()).map(Some)
    }

    /// Receive `amount` raw from the send block `source`. An unopened
    /// account is opened with the default representative.
    pub fn receive(
        &self,
        key: &PrivateKey,
        state: &AccountState,
        source: &BlockHash,
        amount: u128,
    ) -> Result<BlockAndState> {
        if amount == 0 {
            return Err(NanoError::format("receive amount must be greater than zero"));
        }
        let account = self.account_for(key)?;

        let (subtype, previous, representative, root) = match state.frontier() {
            Some(frontier) => (
                StateBlockSubtype::Receive,
                *frontier,
                self.current_representative(state),
                WorkRoot::from(*frontier),
            ),
            None => (
                StateBlockSubtype::Open,
                BlockHash::zero(),
                self.default_representative.clone(),
                WorkRoot::from(*account.public_key()),
            ),
        };
        let balance = state
            .balance()
            .checked_add(amount)
            .ok_or(CreationError::BalanceOverflow {
                balance: state.balance(),
                amount,
            })?;

        let work = self.work_for(root, RECEIVE_THRESHOLD)?;
        let block = StateBlock::builder()
            .subtype(subtype)
            .account(account)
            .previous(previous)
            .representative(representative.clone())
            .balance(balance)
            .link(Link::from(*source))
            .sign(key, work)?;
        debug!("Built {subtype} of {amount} raw from {source}: {}", block.hash());
        Ok(self.finish(block, balance, representative))
    }

    /// Delegate to `representative`; `None` when it already is the
    /// current representative
    pub fn change_representative(
        &self,
        key: &PrivateKey,
        state: &AccountState,
        representative: &NanoAccount,
    ) -> Result<Option<BlockAndState>> {
        let frontier = *state.frontier().ok_or(CreationError::NotOpened)?;
        if state
            .representative()
            .is_some_and(|current| current.equals_ignore_prefix(representative))
        {
            return Ok(None);
        }

        let account = self.account_for(key)?;
        let work = self.work_for(WorkRoot::from(frontier), SEND_THRESHOLD)?;
        let block = StateBlock::builder()
            .subtype(StateBlockSubtype::Change)
            .account(account)
            .previous(frontier)
            .representative(representative.clone())
            .balance(state.balance())
            .link(Link::zero())
            .sign(key, work)?;
        debug!("Built change to {representative}: {}", block.hash());
        Ok(Some(self.finish(
            block,
            state.balance(),
            representative.clone(),
        )))
    }

    fn current_representative(&self, state: &AccountState) -> NanoAccount {
        state
            .representative()
            .cloned()
            .unwrap_or_else(|| self.default_representative.clone())
    }

    fn work_for(&self, root: WorkRoot, threshold: u64) -> Result<WorkSolution> {
        self.work
            .generate(&root, threshold)
            .map_err(|e| CreationError::Work(e.to_string()).into())
    }

    fn finish(&self, block: StateBlock, balance: u128, representative: NanoAccount) -> BlockAndState {
        let state = AccountState::new(*block.hash(), balance, representative);
        BlockAndState::new(Block::State(block), state)
    }
}

impl fmt::Debug for BlockFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockFactory")
            .field("default_representative", &self.default_representative)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
