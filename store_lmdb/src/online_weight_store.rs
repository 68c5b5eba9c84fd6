use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::Amount;
use std::sync::Arc;

/// Periodic samples of the online voting weight, keyed by timestamp
pub struct LmdbOnlineWeightStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

impl LmdbOnlineWeightStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("online_weight"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, time: u64, amount: &Amount) {
        txn.put(
            self.database,
            &time.to_be_bytes(),
            &amount.to_be_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, time: u64) {
        txn.delete(self.database, &time.to_be_bytes(), None).unwrap();
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn clear(&self, txn: &mut LmdbWriteTransaction) {
        txn.clear_db(self.database).unwrap();
    }

    pub fn begin(&self, txn: &dyn Transaction) -> Box<dyn DbIterator<u64, Amount>> {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }
}
