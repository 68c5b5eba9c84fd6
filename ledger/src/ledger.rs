use crate::{
    block_insertion::{BlockInserter, BlockValidatorFactory},
    block_rollback::BlockRollbackPerformer,
    deserialize_bootstrap_weights, GenerateCache, LedgerCache, LedgerConstants, ProcessResult,
};
use rsbtcnew_core::{
    utils::seconds_since_epoch, Account, AccountInfo, Amount, Block, BlockDetails, BlockEnum,
    BlockHash, BlockSideband, BlockSubType, ConfirmationHeightInfo, Epoch, Link, PendingInfo,
    PendingKey, QualifiedRoot, Root, SignatureVerification, StateBlock,
};
use rsbtcnew_store_lmdb::{LmdbReadTransaction, LmdbStore, LmdbWriteTransaction, Transaction};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tracing::info;

/// Gets notified of committed ledger mutations, out of band surfaces
/// (websockets, http callbacks) hang off this
pub trait LedgerObserver: Send + Sync {
    fn block_added(&self, _block: &BlockEnum, _is_epoch_block: bool) {}
    fn block_rolled_back(&self, _block_type: BlockSubType) {}
    fn blocks_cemented(&self, _cemented_count: u64) {}
}

pub struct NullLedgerObserver {}

impl NullLedgerObserver {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullLedgerObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerObserver for NullLedgerObserver {}

/// Owns the canonical state of the block DAG: validates blocks against it,
/// commits state transitions atomically and rolls contested history back.
pub struct Ledger {
    pub store: Arc<LmdbStore>,
    pub cache: LedgerCache,
    pub constants: LedgerConstants,
    pub observer: Arc<dyn LedgerObserver>,
    pub bootstrap_weights: Mutex<HashMap<Account, Amount>>,
    bootstrap_weight_max_blocks: AtomicU64,
    check_bootstrap_weights: AtomicBool,
}

impl Ledger {
    pub fn new(store: Arc<LmdbStore>, constants: LedgerConstants) -> anyhow::Result<Self> {
        Self::with_cache(store, constants, &GenerateCache::new())
    }

    pub fn with_cache(
        store: Arc<LmdbStore>,
        constants: LedgerConstants,
        generate_cache: &GenerateCache,
    ) -> anyhow::Result<Self> {
        let ledger = Self {
            store,
            cache: LedgerCache::new(),
            constants,
            observer: Arc::new(NullLedgerObserver::new()),
            bootstrap_weights: Mutex::new(HashMap::new()),
            bootstrap_weight_max_blocks: AtomicU64::new(0),
            check_bootstrap_weights: AtomicBool::new(true),
        };
        ledger.initialize(generate_cache)?;
        Ok(ledger)
    }

    pub fn set_observer(&mut self, observer: Arc<dyn LedgerObserver>) {
        self.observer = observer;
    }

    fn initialize(&self, generate_cache: &GenerateCache) -> anyhow::Result<()> {
        let empty = {
            let txn = self.store.tx_begin_read();
            self.store.account.begin(&txn).is_end()
        };
        if empty {
            let mut txn = self.store.tx_begin_write();
            self.add_genesis_block(&mut txn);
        }

        let txn = self.store.tx_begin_read();
        if generate_cache.reps || generate_cache.account_count {
            let mut iter = self.store.account.begin(&txn);
            while let Some((_, info)) = iter.current() {
                if generate_cache.reps {
                    self.cache
                        .rep_weights
                        .representation_add(info.representative, info.balance);
                }
                if generate_cache.account_count {
                    self.cache.account_count.fetch_add(1, Ordering::Relaxed);
                }
                iter.next();
            }
        }

        if generate_cache.cemented_count {
            let mut iter = self.store.confirmation_height.begin(&txn);
            while let Some((_, info)) = iter.current() {
                self.cache
                    .cemented_count
                    .fetch_add(info.height, Ordering::Relaxed);
                iter.next();
            }
        }

        if generate_cache.block_count {
            self.cache
                .block_count
                .store(self.store.block.count(&txn), Ordering::Relaxed);
        }

        Ok(())
    }

    fn add_genesis_block(&self, txn: &mut LmdbWriteTransaction) {
        let mut genesis = self.constants.genesis.clone();
        let account = self.constants.genesis_account;
        let hash = genesis.hash();
        genesis.set_sideband(BlockSideband::new(
            account,
            BlockHash::zero(),
            self.constants.genesis_amount,
            1,
            seconds_since_epoch(),
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        ));
        self.store.block.put(txn, &genesis);
        self.store.account.put(
            txn,
            &account,
            &AccountInfo {
                head: hash,
                representative: account,
                open_block: hash,
                balance: self.constants.genesis_amount,
                modified: seconds_since_epoch(),
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        );
        self.store.frontier.put(txn, &hash, &account);
        // the genesis block is confirmed by definition
        self.store.confirmation_height.put(
            txn,
            &account,
            &ConfirmationHeightInfo::new(1, hash),
        );
    }

    pub fn read_txn(&self) -> LmdbReadTransaction {
        self.store.tx_begin_read()
    }

    pub fn rw_txn(&self) -> LmdbWriteTransaction {
        self.store.tx_begin_write()
    }

    /// Validates the block against the current state and, on success,
    /// commits the full set of mutations. On failure nothing is changed.
    pub fn process(
        &self,
        txn: &mut LmdbWriteTransaction,
        block: &mut BlockEnum,
    ) -> Result<(), ProcessResult> {
        self.process_verified(txn, block, SignatureVerification::Unknown)
    }

    /// Like `process`, but the caller may have verified signatures out of
    /// band already
    pub fn process_verified(
        &self,
        txn: &mut LmdbWriteTransaction,
        block: &mut BlockEnum,
        verification: SignatureVerification,
    ) -> Result<(), ProcessResult> {
        let instructions = BlockValidatorFactory::new(self, txn, block, verification)
            .create_validator()
            .validate()?;
        BlockInserter::new(self, txn, block, &instructions).insert();
        Ok(())
    }

    /// Rolls back blocks until `block_hash` is no longer in the store.
    /// Returns the removed blocks, newest first. Fails without touching
    /// anything when a confirmed block would have to be undone.
    pub fn rollback(
        &self,
        txn: &mut LmdbWriteTransaction,
        block_hash: &BlockHash,
    ) -> anyhow::Result<Vec<BlockEnum>> {
        BlockRollbackPerformer::new(self, txn).roll_back_block_hash(block_hash)
    }

    /// Advances the confirmation height of the block's account up to this
    /// block. Returns the newly cemented blocks, oldest first.
    pub fn confirm(
        &self,
        txn: &mut LmdbWriteTransaction,
        hash: BlockHash,
    ) -> anyhow::Result<Vec<BlockEnum>> {
        let block = self
            .get_block(txn, &hash)
            .ok_or_else(|| anyhow!("block not found"))?;
        let account = block.account_calculated();
        let target_height = block.sideband().unwrap().height;
        let current_height = self
            .store
            .confirmation_height
            .get(txn, &account)
            .map(|info| info.height)
            .unwrap_or_default();

        if target_height <= current_height {
            return Ok(Vec::new());
        }

        let mut cemented = Vec::new();
        let mut walk = block;
        loop {
            let height = walk.sideband().unwrap().height;
            if height <= current_height {
                break;
            }
            let previous = walk.previous();
            cemented.push(walk);
            if previous.is_zero() {
                break;
            }
            walk = self
                .get_block(txn, &previous)
                .ok_or_else(|| anyhow!("broken chain while cementing"))?;
        }
        cemented.reverse();

        self.store.confirmation_height.put(
            txn,
            &account,
            &ConfirmationHeightInfo::new(target_height, hash),
        );
        self.cache
            .cemented_count
            .fetch_add(cemented.len() as u64, Ordering::SeqCst);
        self.observer.blocks_cemented(cemented.len() as u64);
        Ok(cemented)
    }

    /// Writes the account row and keeps the confirmation height table and
    /// the account count in step. An empty new head erases the account.
    pub fn update_account(
        &self,
        txn: &mut LmdbWriteTransaction,
        account: &Account,
        old_info: &AccountInfo,
        new_info: &AccountInfo,
    ) {
        if !new_info.head.is_zero() {
            if old_info.head.is_zero() && new_info.open_block == new_info.head {
                debug_assert!(!self.store.confirmation_height.exists(txn, account));
                self.store.confirmation_height.put(
                    txn,
                    account,
                    &ConfirmationHeightInfo::default(),
                );
                self.cache.account_count.fetch_add(1, Ordering::SeqCst);
            }
            self.store.account.put(txn, account, new_info);
        } else {
            self.store.confirmation_height.del(txn, account);
            self.store.account.del(txn, account);
            self.cache.account_count.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /*
     * Reads
     */

    pub fn get_block(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<BlockEnum> {
        self.store.block.get(txn, hash)
    }

    pub fn block_exists(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        self.store.block.exists(txn, hash)
    }

    pub fn account_info(&self, txn: &dyn Transaction, account: &Account) -> Option<AccountInfo> {
        self.store.account.get(txn, account)
    }

    pub fn pending_info(&self, txn: &dyn Transaction, key: &PendingKey) -> Option<PendingInfo> {
        self.store.pending.get(txn, key)
    }

    pub fn get_frontier(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        self.store.frontier.get(txn, hash)
    }

    pub fn get_confirmation_height(
        &self,
        txn: &dyn Transaction,
        account: &Account,
    ) -> Option<ConfirmationHeightInfo> {
        self.store.confirmation_height.get(txn, account)
    }

    pub fn block_confirmed(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        let height = self.store.block.account_height(txn, hash);
        if height == 0 {
            // not stored at all
            return false;
        }
        let Some(account) = self.account(txn, hash) else {
            return false;
        };
        match self.store.confirmation_height.get(txn, &account) {
            Some(info) => info.height >= height,
            None => false,
        }
    }

    /// Balance for account containing the given block
    pub fn balance(&self, txn: &dyn Transaction, hash: &BlockHash) -> Amount {
        if hash.is_zero() {
            Amount::zero()
        } else {
            self.store.block.balance(txn, hash).unwrap_or_default()
        }
    }

    pub fn account_balance(
        &self,
        txn: &dyn Transaction,
        account: &Account,
        only_confirmed: bool,
    ) -> Amount {
        if only_confirmed {
            match self.store.confirmation_height.get(txn, account) {
                Some(info) if info.height > 0 => self.balance(txn, &info.frontier),
                _ => Amount::zero(),
            }
        } else {
            self.account_info(txn, account)
                .map(|info| info.balance)
                .unwrap_or_default()
        }
    }

    /// Sum of all receivable entries for the account
    pub fn account_receivable(&self, txn: &dyn Transaction, account: &Account) -> Amount {
        let mut result = Amount::zero();
        let mut iter = self
            .store
            .pending
            .begin_at_key(txn, &PendingKey::new(*account, BlockHash::zero()));
        while let Some((key, info)) = iter.current() {
            if key.account != *account {
                break;
            }
            result += info.amount;
            iter.next();
        }
        result
    }

    /// Amount the block transferred, None when the block or its
    /// predecessor is missing
    pub fn amount(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Amount> {
        let block = self.get_block(txn, hash)?;
        let block_balance = block.balance_calculated();
        let previous_balance = if block.previous().is_zero() {
            Amount::zero()
        } else {
            self.store.block.balance(txn, &block.previous())?
        };
        if block_balance > previous_balance {
            Some(block_balance - previous_balance)
        } else {
            Some(previous_balance - block_balance)
        }
    }

    /// Return latest block for account
    pub fn latest(&self, txn: &dyn Transaction, account: &Account) -> Option<BlockHash> {
        self.account_info(txn, account).map(|info| info.head)
    }

    /// Return latest root for account, account number if there are no
    /// blocks for this account
    pub fn latest_root(&self, txn: &dyn Transaction, account: &Account) -> Root {
        match self.account_info(txn, account) {
            Some(info) => info.head.into(),
            None => account.into(),
        }
    }

    /// Return account containing the given block
    pub fn account(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        self.store.block.account(txn, hash)
    }

    /// The block that currently occupies this root's slot
    pub fn successor(&self, txn: &dyn Transaction, root: &QualifiedRoot) -> Option<BlockEnum> {
        let successor = if root.previous.is_zero() {
            match self.account_info(txn, &root.root.into()) {
                Some(info) => info.open_block,
                None => self
                    .store
                    .block
                    .successor(txn, &root.previous)
                    .unwrap_or_default(),
            }
        } else {
            self.store
                .block
                .successor(txn, &root.previous)
                .unwrap_or_default()
        };
        if successor.is_zero() {
            None
        } else {
            self.get_block(txn, &successor)
        }
    }

    /// Walks the chain backwards to the nearest block naming a
    /// representative
    pub fn representative_block_hash(&self, txn: &dyn Transaction, hash: &BlockHash) -> BlockHash {
        let mut hash = *hash;
        loop {
            let Some(block) = self.get_block(txn, &hash) else {
                return BlockHash::zero();
            };
            if block.representative().is_some() {
                return hash;
            }
            hash = block.previous();
        }
    }

    pub fn is_send(&self, txn: &dyn Transaction, block: &StateBlock) -> bool {
        if block.hashables.previous.is_zero() {
            return false;
        }
        block.hashables.balance < self.balance(txn, &block.hashables.previous)
    }

    pub fn block_destination(&self, txn: &dyn Transaction, block: &BlockEnum) -> Account {
        match block {
            BlockEnum::LegacySend(send) => send.mandatory_destination(),
            BlockEnum::State(state) if self.is_send(txn, state) => state.hashables.link.into(),
            _ => Account::zero(),
        }
    }

    pub fn block_source(&self, txn: &dyn Transaction, block: &BlockEnum) -> BlockHash {
        match block {
            BlockEnum::State(state) if !self.is_send(txn, state) => state.hashables.link.into(),
            _ => block.source().unwrap_or_default(),
        }
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.constants.epochs.is_epoch_link(link)
    }

    pub fn epoch_link(&self, epoch: Epoch) -> Option<Link> {
        self.constants.epochs.link(epoch).copied()
    }

    pub fn epoch_signer(&self, link: &Link) -> Option<Account> {
        self.constants.epochs.epoch_signer(link)
    }

    /// Could all of the block's dependencies be satisfied right now?
    pub fn could_fit(&self, txn: &dyn Transaction, block: &BlockEnum) -> bool {
        match block {
            BlockEnum::LegacySend(_) | BlockEnum::LegacyChange(_) => {
                self.block_exists(txn, &block.previous())
            }
            BlockEnum::LegacyReceive(receive) => {
                self.block_exists(txn, &receive.hashables.previous)
                    && self.block_exists(txn, &receive.hashables.source)
            }
            BlockEnum::LegacyOpen(open) => self.block_exists(txn, &open.hashables.source),
            BlockEnum::State(state) => {
                let previous_fits = state.hashables.previous.is_zero()
                    || self.block_exists(txn, &state.hashables.previous);
                if !previous_fits {
                    return false;
                }
                if self.is_send(txn, state) {
                    return true;
                }
                state.hashables.link.is_zero()
                    || self.is_epoch_link(&state.hashables.link)
                    || self.block_exists(txn, &state.hashables.link.into())
            }
        }
    }

    /*
     * Weights
     */

    /// Vote weight of an account. While the ledger is still syncing from
    /// scratch, a static bootstrap override may be served instead of the
    /// cache; once the block count crosses the threshold the override
    /// latches off for good.
    pub fn weight(&self, account: &Account) -> Amount {
        if self.check_bootstrap_weights.load(Ordering::SeqCst) {
            if self.cache.block_count.load(Ordering::SeqCst) < self.bootstrap_weight_max_blocks()
            {
                let weights = self.bootstrap_weights.lock().unwrap();
                if let Some(weight) = weights.get(account) {
                    return *weight;
                }
            } else {
                self.check_bootstrap_weights.store(false, Ordering::SeqCst);
            }
        }
        self.cache.rep_weights.representation_get(account)
    }

    pub fn bootstrap_weight_max_blocks(&self) -> u64 {
        self.bootstrap_weight_max_blocks.load(Ordering::SeqCst)
    }

    pub fn set_bootstrap_weight_max_blocks(&self, max: u64) {
        self.bootstrap_weight_max_blocks.store(max, Ordering::SeqCst)
    }

    /// Loads the static bootstrap weight blob. Ignored when the local
    /// ledger already has more blocks than the blob was generated at.
    pub fn load_bootstrap_weights(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let (max_blocks, weights) = deserialize_bootstrap_weights(bytes)?;
        if self.cache.block_count.load(Ordering::SeqCst) < max_blocks {
            info!("initializing bootstrap weights for {} accounts", weights.len());
            self.set_bootstrap_weight_max_blocks(max_blocks);
            *self.bootstrap_weights.lock().unwrap() = weights;
        }
        Ok(())
    }
}
