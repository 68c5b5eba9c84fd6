use crate::{
    iterator::DbIterator, LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::{Deserialize, Stream},
    EndpointKey,
};
use std::sync::Arc;

/// Value-less table of recently seen peer endpoints
pub struct LmdbPeerStore {
    _env: Arc<LmdbEnv>,
    database: Database,
}

/// Peers are stored without a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoValue {}

impl Deserialize for NoValue {
    type Target = Self;

    fn deserialize(_stream: &mut dyn Stream) -> anyhow::Result<Self> {
        Ok(NoValue {})
    }
}

impl LmdbPeerStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("peers"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, endpoint: &EndpointKey) {
        txn.put(self.database, &endpoint.to_bytes(), &[], WriteFlags::empty())
            .unwrap();
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, endpoint: &EndpointKey) {
        txn.delete(self.database, &endpoint.to_bytes(), None).unwrap();
    }

    pub fn exists(&self, txn: &dyn Transaction, endpoint: &EndpointKey) -> bool {
        crate::exists(txn, self.database, &endpoint.to_bytes())
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    pub fn clear(&self, txn: &mut LmdbWriteTransaction) {
        txn.clear_db(self.database).unwrap();
    }

    pub fn begin(&self, txn: &dyn Transaction) -> Box<dyn DbIterator<EndpointKey, NoValue>> {
        LmdbIteratorImpl::new_iterator(txn, self.database, None, true)
    }
}
