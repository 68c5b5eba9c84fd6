use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::{Deserialize, StreamAdapter},
    BlockHash, UncheckedInfo, UncheckedKey,
};
use std::sync::Arc;

pub type UncheckedIterator = Box<dyn DbIterator<UncheckedKey, UncheckedInfo>>;

/// Buffers blocks whose dependency has not arrived yet, keyed by the
/// missing hash
pub struct LmdbUncheckedStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

impl LmdbUncheckedStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("unchecked"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, key: &UncheckedKey, info: &UncheckedInfo) {
        txn.put(
            self.database,
            &key.to_bytes(),
            &info.to_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction, key: &UncheckedKey) -> Option<UncheckedInfo> {
        match crate::get(txn, self.database, &key.to_bytes()) {
            Ok(bytes) => {
                let mut stream = StreamAdapter::new(bytes);
                UncheckedInfo::deserialize(&mut stream).ok()
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load unchecked info: {:?}", e),
        }
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, key: &UncheckedKey) {
        txn.delete(self.database, &key.to_bytes(), None).unwrap();
    }

    pub fn exists(&self, txn: &dyn Transaction, key: &UncheckedKey) -> bool {
        crate::exists(txn, self.database, &key.to_bytes())
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn clear(&self, txn: &mut LmdbWriteTransaction) {
        txn.clear_db(self.database).unwrap();
    }

    pub fn begin(&self, txn: &dyn Transaction) -> UncheckedIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }

    /// All entries waiting for `dependency` start at this cursor position
    pub fn lower_bound(&self, txn: &dyn Transaction, dependency: &BlockHash) -> UncheckedIterator {
        let key = UncheckedKey::new(*dependency, BlockHash::zero());
        LmdbIteratorImpl::new_iterator(txn, self.database, Some(&key.to_bytes()), true)
    }
}
