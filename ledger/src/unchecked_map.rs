use rsbtcnew_core::{Block, BlockHash, UncheckedInfo, UncheckedKey};
use rsbtcnew_store_lmdb::{LmdbStore, LmdbWriteTransaction, Transaction};
use std::sync::Arc;
use tracing::debug;

/// Buffers blocks that arrived before one of their dependencies. Entries
/// wake up when the dependency commits and get garbage collected once
/// they exceed the configured age.
pub struct UncheckedMap {
    store: Arc<LmdbStore>,
}

impl UncheckedMap {
    pub fn new(store: Arc<LmdbStore>) -> Self {
        Self { store }
    }

    pub fn put(
        &self,
        txn: &mut LmdbWriteTransaction,
        dependency: BlockHash,
        info: &UncheckedInfo,
    ) {
        let key = UncheckedKey::new(dependency, info.block.hash());
        self.store.unchecked.put(txn, &key, info);
    }

    pub fn get(&self, txn: &dyn Transaction, dependency: &BlockHash) -> Vec<UncheckedInfo> {
        let mut result = Vec::new();
        let mut iter = self.store.unchecked.lower_bound(txn, dependency);
        while let Some((key, info)) = iter.current() {
            if key.previous != *dependency {
                break;
            }
            result.push(info.clone());
            iter.next();
        }
        result
    }

    pub fn exists(&self, txn: &dyn Transaction, key: &UncheckedKey) -> bool {
        self.store.unchecked.exists(txn, key)
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, key: &UncheckedKey) {
        self.store.unchecked.del(txn, key);
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        self.store.unchecked.count(txn)
    }

    /// A block with this hash has been committed. Removes and returns all
    /// entries that were waiting for it so the caller can re-submit them.
    pub fn trigger(
        &self,
        txn: &mut LmdbWriteTransaction,
        dependency: &BlockHash,
    ) -> Vec<UncheckedInfo> {
        let entries = self.get(txn, dependency);
        for entry in &entries {
            let key = UncheckedKey::new(*dependency, entry.block.hash());
            self.store.unchecked.del(txn, &key);
        }
        entries
    }

    /// Deletes entries older than the cutoff, at most `max_batch` per
    /// call so a large backlog cannot monopolize the write transaction
    pub fn cleanup(
        &self,
        txn: &mut LmdbWriteTransaction,
        cutoff_seconds: u64,
        max_batch: usize,
    ) -> usize {
        let mut stale = Vec::new();
        let mut iter = self.store.unchecked.begin(txn);
        while let Some((key, info)) = iter.current() {
            if stale.len() >= max_batch {
                break;
            }
            if info.modified < cutoff_seconds {
                stale.push(key.clone());
            }
            iter.next();
        }
        drop(iter);
        let deleted = stale.len();
        for key in stale {
            self.store.unchecked.del(txn, &key);
        }
        if deleted > 0 {
            debug!("unchecked cleanup removed {} entries", deleted);
        }
        deleted
    }
}
