use crate::{LmdbEnv, LmdbWriteTransaction, Transaction};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{Account, BlockHash};
use std::sync::Arc;

/// Maps legacy head blocks to the account owning them. State block heads
/// are deliberately absent so that legacy blocks cannot be appended after
/// a state block.
pub struct LmdbFrontierStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

impl LmdbFrontierStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("frontiers"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, hash: &BlockHash, account: &Account) {
        txn.put(
            self.database,
            hash.as_bytes(),
            account.as_bytes(),
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        match crate::get(txn, self.database, hash.as_bytes()) {
            Ok(bytes) => Account::from_slice(bytes),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load frontier: {:?}", e),
        }
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, hash: &BlockHash) {
        txn.delete(self.database, hash.as_bytes(), None).unwrap();
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }
}
