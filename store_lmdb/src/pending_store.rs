use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::{Deserialize, StreamAdapter},
    Account, PendingInfo, PendingKey,
};
use std::sync::Arc;

pub type PendingIterator = Box<dyn DbIterator<PendingKey, PendingInfo>>;

pub struct LmdbPendingStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

impl LmdbPendingStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("pending"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, key: &PendingKey, pending: &PendingInfo) {
        txn.put(
            self.database,
            &key.to_bytes(),
            &pending.to_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction, key: &PendingKey) -> Option<PendingInfo> {
        match crate::get(txn, self.database, &key.to_bytes()) {
            Ok(bytes) => {
                let mut stream = StreamAdapter::new(bytes);
                PendingInfo::deserialize(&mut stream).ok()
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load pending info: {:?}", e),
        }
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, key: &PendingKey) {
        txn.delete(self.database, &key.to_bytes(), None).unwrap();
    }

    pub fn exists(&self, txn: &dyn Transaction, key: &PendingKey) -> bool {
        crate::exists(txn, self.database, &key.to_bytes())
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn begin(&self, txn: &dyn Transaction) -> PendingIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }

    pub fn begin_at_key(&self, txn: &dyn Transaction, key: &PendingKey) -> PendingIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, Some(&key.to_bytes()), true)
    }

    /// Is there any pending entry for the given account?
    pub fn any(&self, txn: &dyn Transaction, account: &Account) -> bool {
        let iterator = self.begin_at_key(txn, &PendingKey::new(*account, Default::default()));
        match iterator.current() {
            Some((key, _)) => key.account == *account,
            None => false,
        }
    }
}
