use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::{Deserialize, StreamAdapter},
    Account, ConfirmationHeightInfo,
};
use std::sync::Arc;

pub type ConfirmationHeightIterator = Box<dyn DbIterator<Account, ConfirmationHeightInfo>>;

pub struct LmdbConfirmationHeightStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

impl LmdbConfirmationHeightStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("confirmation_height"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(
        &self,
        txn: &mut LmdbWriteTransaction,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) {
        txn.put(
            self.database,
            account.as_bytes(),
            &info.to_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction, account: &Account) -> Option<ConfirmationHeightInfo> {
        match crate::get(txn, self.database, account.as_bytes()) {
            Ok(bytes) => {
                let mut stream = StreamAdapter::new(bytes);
                ConfirmationHeightInfo::deserialize(&mut stream).ok()
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load confirmation height: {:?}", e),
        }
    }

    pub fn exists(&self, txn: &dyn Transaction, account: &Account) -> bool {
        crate::exists(txn, self.database, account.as_bytes())
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, account: &Account) {
        txn.delete(self.database, account.as_bytes(), None).unwrap();
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn clear(&self, txn: &mut LmdbWriteTransaction) {
        txn.clear_db(self.database).unwrap();
    }

    pub fn begin(&self, txn: &dyn Transaction) -> ConfirmationHeightIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }
}
