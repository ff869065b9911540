//! Network-synchronized account
//!
//! Wraps a [`LocalAccount`] and keeps it in step with the ledger: state is
//! fetched on first use, each block is published as soon as it is built,
//! and a stale `previous` triggers a refresh and a rebuild. One fair lock
//! per account serializes every read-build-publish sequence.

use crate::config::Settings;
use crate::core::{AccountState, Block, BlockHash, NanoAccount, PrivateKey, WorkGenerator};
use crate::error::{NanoError, Result};
use crate::network::{AccountInfo, LedgerNetwork, ProcessResponse, RetryPolicy};
use crate::wallet::factory::BlockFactory;
use crate::wallet::local::LocalAccount;
use log::{debug, info, warn};
use parking_lot::FairMutex;
use std::sync::Arc;

pub const DEFAULT_RECEIVE_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// State has never been fetched, or the last fetch failed
    Uninitialized,
    Synced,
}

/// What a build step hands to the publish loop: a block that must go out,
/// or an optional one when there may be nothing to do
trait Built {
    fn block(&self) -> Option<&Block>;
}

impl Built for Block {
    fn block(&self) -> Option<&Block> {
        Some(self)
    }
}

impl Built for Option<Block> {
    fn block(&self) -> Option<&Block> {
        self.as_ref()
    }
}

struct Synced {
    local: LocalAccount,
    status: SyncStatus,
}

pub struct NetworkAccount {
    account: NanoAccount,
    inner: FairMutex<Synced>,
    network: Arc<dyn LedgerNetwork>,
    policy: RetryPolicy,
    receive_batch_size: usize,
    receive_threshold: u128,
}

impl NetworkAccount {
    pub fn new(
        key: PrivateKey,
        factory: BlockFactory,
        network: Arc<dyn LedgerNetwork>,
    ) -> Result<NetworkAccount> {
        let local = LocalAccount::new(key, factory, AccountState::UNOPENED)?;
        Ok(NetworkAccount {
            account: local.account().clone(),
            inner: FairMutex::new(Synced {
                local,
                status: SyncStatus::Uninitialized,
            }),
            network,
            policy: RetryPolicy::default(),
            receive_batch_size: DEFAULT_RECEIVE_BATCH_SIZE,
            receive_threshold: 0,
        })
    }

    /// Build an account from loaded settings; they must name a default
    /// representative
    pub fn from_settings(
        key: PrivateKey,
        work: Arc<dyn WorkGenerator>,
        network: Arc<dyn LedgerNetwork>,
        settings: &Settings,
    ) -> Result<NetworkAccount> {
        settings.validate()?;
        let representative = settings.representative_account()?.ok_or_else(|| {
            NanoError::Config("a default representative is required".to_string())
        })?;
        let factory = BlockFactory::new(work, representative).with_prefix(&settings.address_prefix)?;
        Ok(NetworkAccount::new(key, factory, network)?
            .with_policy(RetryPolicy::new(settings.max_publish_attempts))
            .with_receive_batch_size(settings.receive_batch_size)
            .with_receive_threshold(settings.receive_threshold_raw))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> NetworkAccount {
        self.policy = policy;
        self
    }

    pub fn with_receive_batch_size(mut self, size: usize) -> NetworkAccount {
        self.receive_batch_size = size.max(1);
        self
    }

    /// Smallest pending amount `receive_pending` picks up
    pub fn with_receive_threshold(mut self, threshold: u128) -> NetworkAccount {
        self.receive_threshold = threshold;
        self
    }

    pub fn receive_threshold(&self) -> u128 {
        self.receive_threshold
    }

    pub fn account(&self) -> &NanoAccount {
        &self.account
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.lock().status
    }

    /// Cached state, fetching it first if it never has been
    pub fn state(&self) -> Result<AccountState> {
        let mut inner = self.inner.lock();
        self.ensure_synced(&mut inner)?;
        Ok(inner.local.state().clone())
    }

    /// Fetch the account's current state from the ledger
    pub fn refresh_state(&self) -> Result<AccountState> {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner)?;
        Ok(inner.local.state().clone())
    }

    pub fn send(&self, destination: &NanoAccount, amount: u128) -> Result<Block> {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, |local| local.create_send(destination, amount))
    }

    /// Send the whole balance; `None` when the balance is zero
    pub fn send_all(&self, destination: &NanoAccount) -> Result<Option<Block>> {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, |local| local.create_send_all(destination))
    }

    pub fn receive(&self, source: &BlockHash, amount: u128) -> Result<Block> {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, |local| local.create_receive(source, amount))
    }

    /// `None` when `representative` is already the current one
    pub fn change_representative(&self, representative: &NanoAccount) -> Result<Option<Block>> {
        let mut inner = self.inner.lock();
        self.publish(&mut inner, |local| {
            local.create_change_representative(representative)
        })
    }

    /// Receive up to `count` pending sends of at least `threshold` raw.
    /// The lock is held for the whole batch.
    pub fn receive_batch(&self, count: usize, threshold: u128) -> Result<Vec<Block>> {
        let mut inner = self.inner.lock();
        self.receive_batch_locked(&mut inner, count, threshold)
    }

    /// `receive_all` with the configured threshold
    pub fn receive_pending(&self) -> Result<Vec<Block>> {
        self.receive_all(self.receive_threshold)
    }

    /// Receive batches until one comes back short. Never returns while
    /// someone keeps sending to the account faster than it receives.
    pub fn receive_all(&self, threshold: u128) -> Result<Vec<Block>> {
        let mut inner = self.inner.lock();
        let mut received = Vec::new();
        loop {
            let batch = self.receive_batch_locked(&mut inner, self.receive_batch_size, threshold)?;
            let short = batch.len() < self.receive_batch_size;
            received.extend(batch);
            if short {
                return Ok(received);
            }
        }
    }

    fn receive_batch_locked(
        &self,
        inner: &mut Synced,
        count: usize,
        threshold: u128,
    ) -> Result<Vec<Block>> {
        self.ensure_synced(inner)?;
        let pending = self.network.pending(&self.account, count, threshold)?;
        debug!("{} receivable block(s) for {}", pending.len(), self.account);

        let mut blocks = Vec::with_capacity(pending.len());
        for receivable in pending {
            let block = self.publish(inner, |local| {
                local.create_receive(&receivable.hash, receivable.amount)
            })?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn ensure_synced(&self, inner: &mut Synced) -> Result<()> {
        if inner.status == SyncStatus::Uninitialized {
            self.refresh(inner)?;
        }
        Ok(())
    }

    fn refresh(&self, inner: &mut Synced) -> Result<()> {
        match self.network.account_info(&self.account) {
            Ok(snapshot) => {
                let state = AccountInfo::into_state(snapshot);
                debug!("Refreshed {}: {state}", self.account);
                inner.local.update_state(state);
                inner.status = SyncStatus::Synced;
                Ok(())
            }
            Err(e) => {
                inner.status = SyncStatus::Uninitialized;
                Err(e)
            }
        }
    }

    /// Build with `build`, publish, and commit on acceptance. Stale
    /// rejections refresh and rebuild up to the policy's attempt limit.
    fn publish<T, F>(&self, inner: &mut Synced, mut build: F) -> Result<T>
    where
        T: Built,
        F: FnMut(&mut LocalAccount) -> Result<T>,
    {
        self.ensure_synced(inner)?;
        let attempts = self.policy.max_attempts();
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            let built = build(&mut inner.local)?;
            let Some(block) = built.block() else {
                return Ok(built);
            };

            let response = match self.network.process(block) {
                Ok(response) => response,
                Err(e) => {
                    inner.local.discard_pending();
                    return Err(e);
                }
            };

            match response {
                ProcessResponse::Accepted(hash) => {
                    if hash != *block.hash() {
                        warn!("Node reported {hash} for published block {}", block.hash());
                    }
                    info!("Published {block} for {}", self.account);
                    inner.local.commit()?;
                    return Ok(built);
                }
                ProcessResponse::Rejected(reason) if self.policy.is_stale(&reason) => {
                    inner.local.discard_pending();
                    warn!(
                        "{block} rejected as stale ({reason}), attempt {attempt}/{attempts}"
                    );
                    last_reason = reason;
                    if attempt < attempts {
                        self.refresh(inner)?;
                    }
                }
                ProcessResponse::Rejected(reason) => {
                    inner.local.discard_pending();
                    return Err(NanoError::Rejected(reason));
                }
            }
        }

        inner.status = SyncStatus::Uninitialized;
        Err(NanoError::ConcurrentUse {
            attempts,
            reason: last_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;
    use crate::network::{BlockInfo, Receivable};
    use crate::wallet::factory::test_support::CountingWork;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedLedger {
        info: Mutex<Option<AccountInfo>>,
        replies: Mutex<VecDeque<ProcessResponse>>,
        processed: Mutex<Vec<Block>>,
        info_calls: Mutex<u32>,
    }

    impl LedgerNetwork for ScriptedLedger {
        fn account_info(&self, _account: &NanoAccount) -> Result<Option<AccountInfo>> {
            *self.info_calls.lock() += 1;
            Ok(self.info.lock().clone())
        }

        fn block_info(&self, _hash: &BlockHash) -> Result<Option<BlockInfo>> {
            Ok(None)
        }

        fn pending(&self, _: &NanoAccount, _: usize, _: u128) -> Result<Vec<Receivable>> {
            Ok(Vec::new())
        }

        fn process(&self, block: &Block) -> Result<ProcessResponse> {
            self.processed.lock().push(block.clone());
            Ok(self
                .replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| ProcessResponse::Accepted(*block.hash())))
        }
    }

    fn wallet(ledger: Arc<ScriptedLedger>) -> NetworkAccount {
        let factory = BlockFactory::new(Arc::new(CountingWork::default()), representative());
        NetworkAccount::new(private_key(), factory, ledger).unwrap()
    }

    fn opened_ledger(balance: u128) -> Arc<ScriptedLedger> {
        let ledger = ScriptedLedger::default();
        *ledger.info.lock() = Some(AccountInfo {
            frontier: previous(),
            balance,
            representative: representative(),
        });
        Arc::new(ledger)
    }

    #[test]
    fn test_first_use_refreshes_lazily() {
        let ledger = opened_ledger(100);
        let wallet = wallet(ledger.clone());
        assert_eq!(wallet.status(), SyncStatus::Uninitialized);
        assert_eq!(*ledger.info_calls.lock(), 0);

        wallet.send(&account(), 10).unwrap();
        assert_eq!(wallet.status(), SyncStatus::Synced);
        assert_eq!(*ledger.info_calls.lock(), 1);
        assert_eq!(wallet.state().unwrap().balance(), 90);
    }

    #[test]
    fn test_unknown_account_is_unopened() {
        let wallet = wallet(Arc::new(ScriptedLedger::default()));
        assert_eq!(wallet.refresh_state().unwrap(), AccountState::UNOPENED);
    }

    #[test]
    fn test_unclassified_rejection_is_fatal_at_once() {
        let ledger = opened_ledger(100);
        ledger
            .replies
            .lock()
            .push_back(ProcessResponse::Rejected("Bad signature".to_string()));
        let wallet = wallet(ledger.clone());

        let err = wallet.send(&account(), 10).unwrap_err();
        assert!(matches!(err, NanoError::Rejected(ref reason) if reason == "Bad signature"));
        assert_eq!(ledger.processed.lock().len(), 1);
        assert_eq!(wallet.state().unwrap().balance(), 100);
    }

    #[test]
    fn test_custom_classifier_drives_retry() {
        let ledger = opened_ledger(100);
        ledger
            .replies
            .lock()
            .push_back(ProcessResponse::Rejected("E_STALE".to_string()));
        let wallet = wallet(ledger.clone())
            .with_policy(RetryPolicy::default().with_classifier(|r| r == "E_STALE"));

        wallet.send(&account(), 10).unwrap();
        assert_eq!(ledger.processed.lock().len(), 2);
        assert_eq!(*ledger.info_calls.lock(), 2);
        assert_eq!(wallet.status(), SyncStatus::Synced);
    }

    #[test]
    fn test_exhausted_retries_leave_account_uninitialized() {
        let ledger = opened_ledger(100);
        for _ in 0..2 {
            ledger
                .replies
                .lock()
                .push_back(ProcessResponse::Rejected("Fork".to_string()));
        }
        let wallet = wallet(ledger.clone()).with_policy(RetryPolicy::new(2));

        let err = wallet.send(&account(), 10).unwrap_err();
        assert!(matches!(err, NanoError::ConcurrentUse { attempts: 2, .. }));
        assert_eq!(wallet.status(), SyncStatus::Uninitialized);
        // the next call fetches again before building
        wallet.send(&account(), 10).unwrap();
        assert_eq!(*ledger.info_calls.lock(), 3);
        assert_eq!(wallet.status(), SyncStatus::Synced);
    }

    #[test]
    fn test_threshold_defaults_to_zero() {
        let wallet = wallet(opened_ledger(0));
        assert_eq!(wallet.receive_threshold(), 0);
        let wallet = wallet.with_receive_threshold(7);
        assert_eq!(wallet.receive_threshold(), 7);
        assert!(wallet.receive_pending().unwrap().is_empty());
    }

    #[test]
    fn test_nothing_to_do_publishes_nothing() {
        let ledger = opened_ledger(0);
        let wallet = wallet(ledger.clone());
        assert!(wallet.send_all(&account()).unwrap().is_none());
        assert!(wallet
            .change_representative(&representative())
            .unwrap()
            .is_none());
        assert!(ledger.processed.lock().is_empty());
    }
}
