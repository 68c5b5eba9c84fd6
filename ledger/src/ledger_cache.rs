use crate::RepWeights;
use std::sync::atomic::AtomicU64;

/// Aggregates derived from the store, kept in memory and adjusted with
/// every commit and rollback
pub struct LedgerCache {
    pub rep_weights: RepWeights,
    pub cemented_count: AtomicU64,
    pub block_count: AtomicU64,
    pub account_count: AtomicU64,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self {
            rep_weights: RepWeights::new(),
            cemented_count: AtomicU64::new(0),
            block_count: AtomicU64::new(0),
            account_count: AtomicU64::new(0),
        }
    }
}

impl Default for LedgerCache {
    fn default() -> Self {
        Self::new()
    }
}
