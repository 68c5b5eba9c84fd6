use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{Account, AccountInfo};
use std::sync::Arc;

pub type AccountIterator = Box<dyn DbIterator<Account, AccountInfo>>;

pub struct LmdbAccountStore {
    _env: Arc<LmdbEnv>,

    /// U256 (arbitrary key) -> blob
    database: Database,
}

impl LmdbAccountStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("accounts"), DatabaseFlags::empty())?;
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
        info: &AccountInfo,
    ) {
        txn.put(
            self.database,
            account.as_bytes(),
            &info.to_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction, account: &Account) -> Option<AccountInfo> {
        let result = crate::get(txn, self.database, account.as_bytes());
        match result {
            Ok(bytes) => {
                let mut stream = rsbtcnew_core::utils::StreamAdapter::new(bytes);
                <AccountInfo as rsbtcnew_core::utils::Deserialize>::deserialize(&mut stream).ok()
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load account info: {:?}", e),
        }
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, account: &Account) {
        txn.delete(self.database, account.as_bytes(), None).unwrap();
    }

    pub fn exists(&self, txn: &dyn Transaction, account: &Account) -> bool {
        crate::exists(txn, self.database, account.as_bytes())
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn begin(&self, txn: &dyn Transaction) -> AccountIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }

    pub fn begin_account(&self, txn: &dyn Transaction, account: &Account) -> AccountIterator {
        LmdbIteratorImpl::new_iterator(txn, self.database, Some(account.as_bytes()), true)
    }
}
