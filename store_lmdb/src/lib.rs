#[macro_use]
extern crate anyhow;

mod iterator;
pub use iterator::{BinaryDbIterator, DbIterator, LmdbIteratorImpl};

mod lmdb_config;
pub use lmdb_config::{LmdbConfig, SyncStrategy};

mod lmdb_env;
pub use lmdb_env::{EnvOptions, LmdbEnv, TestDbFile, TestLmdbEnv};

mod account_store;
pub use account_store::LmdbAccountStore;

mod block_store;
pub use block_store::{BlockCounts, LmdbBlockStore};

mod confirmation_height_store;
pub use confirmation_height_store::LmdbConfirmationHeightStore;

mod frontier_store;
pub use frontier_store::LmdbFrontierStore;

mod online_weight_store;
pub use online_weight_store::LmdbOnlineWeightStore;

mod peer_store;
pub use peer_store::{LmdbPeerStore, NoValue};

mod pending_store;
pub use pending_store::LmdbPendingStore;

mod unchecked_store;
pub use unchecked_store::LmdbUncheckedStore;

mod version_store;
pub use version_store::LmdbVersionStore;

mod vote_store;
pub use vote_store::LmdbVoteStore;

mod store;
pub use store::{create_backup_file, LmdbStore, LmdbStoreBuilder};

use lmdb::{Database, InactiveTransaction, RoCursor, RoTransaction, RwTransaction, WriteFlags};
use std::{any::Any, mem, sync::Arc};

/// Tables of the store. Write transactions name the tables they intend to
/// touch; the LMDB backend has a single environment-wide writer and only
/// uses the names for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Table {
    Accounts,
    Blocks,
    ConfirmationHeight,
    Frontiers,
    Meta,
    OnlineWeight,
    Peers,
    Pending,
    Unchecked,
    Vote,
}

pub trait Transaction {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn refresh(&mut self);
}

pub trait TransactionTracker: Send + Sync {
    fn txn_start(&self, txn_id: u64, is_write: bool);
    fn txn_end(&self, txn_id: u64, is_write: bool);
}

pub struct NullTransactionTracker {}

impl NullTransactionTracker {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullTransactionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionTracker for NullTransactionTracker {
    fn txn_start(&self, _txn_id: u64, _is_write: bool) {}

    fn txn_end(&self, _txn_id: u64, _is_write: bool) {}
}

enum RoTxnState {
    Inactive(InactiveTransaction<'static>),
    Active(RoTransaction<'static>),
    Transitioning,
}

pub struct LmdbReadTransaction {
    txn_id: u64,
    callbacks: Arc<dyn TransactionTracker>,
    txn: RoTxnState,
}

impl LmdbReadTransaction {
    pub fn new(
        txn_id: u64,
        env: &lmdb::Environment,
        callbacks: Arc<dyn TransactionTracker>,
    ) -> lmdb::Result<Self> {
        let txn = env.begin_ro_txn()?;
        let txn =
            unsafe { std::mem::transmute::<RoTransaction<'_>, RoTransaction<'static>>(txn) };
        callbacks.txn_start(txn_id, false);

        Ok(Self {
            txn_id,
            callbacks,
            txn: RoTxnState::Active(txn),
        })
    }

    pub fn txn(&self) -> &lmdb::RoTransaction {
        match &self.txn {
            RoTxnState::Active(t) => t,
            _ => panic!("LMDB read transaction not active"),
        }
    }

    pub fn reset(&mut self) {
        let t = mem::replace(&mut self.txn, RoTxnState::Transitioning);
        self.txn = match t {
            RoTxnState::Active(t) => RoTxnState::Inactive(t.reset()),
            RoTxnState::Inactive(_) => panic!("Cannot reset inactive transaction"),
            RoTxnState::Transitioning => unreachable!(),
        };
        self.callbacks.txn_end(self.txn_id, false);
    }

    pub fn renew(&mut self) {
        let t = mem::replace(&mut self.txn, RoTxnState::Transitioning);
        self.txn = match t {
            RoTxnState::Active(_) => panic!("Cannot renew active transaction"),
            RoTxnState::Inactive(t) => RoTxnState::Active(t.renew().unwrap()),
            RoTxnState::Transitioning => unreachable!(),
        };
        self.callbacks.txn_start(self.txn_id, false);
    }
}

impl Drop for LmdbReadTransaction {
    fn drop(&mut self) {
        let t = mem::replace(&mut self.txn, RoTxnState::Transitioning);
        // This uses commit rather than abort, as it is needed when opening databases with a read only transaction
        if let RoTxnState::Active(t) = t {
            lmdb::Transaction::commit(t).unwrap()
        }
        self.callbacks.txn_end(self.txn_id, false);
    }
}

impl Transaction for LmdbReadTransaction {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn refresh(&mut self) {
        self.reset();
        self.renew();
    }
}

enum RwTxnState<'a> {
    Inactive(),
    Active(RwTransaction<'a>),
    Transitioning,
}

pub struct LmdbWriteTransaction {
    env: &'static lmdb::Environment,
    txn_id: u64,
    callbacks: Arc<dyn TransactionTracker>,
    txn: RwTxnState<'static>,
}

impl LmdbWriteTransaction {
    pub fn new(
        txn_id: u64,
        env: &lmdb::Environment,
        callbacks: Arc<dyn TransactionTracker>,
    ) -> lmdb::Result<Self> {
        let env = unsafe {
            std::mem::transmute::<&lmdb::Environment, &'static lmdb::Environment>(env)
        };
        let mut tx = Self {
            env,
            txn_id,
            callbacks,
            txn: RwTxnState::Inactive(),
        };
        tx.renew();
        Ok(tx)
    }

    pub fn rw_txn(&self) -> &RwTransaction<'static> {
        match &self.txn {
            RwTxnState::Active(t) => t,
            _ => panic!("txn not active"),
        }
    }

    pub fn rw_txn_mut(&mut self) -> &mut RwTransaction<'static> {
        match &mut self.txn {
            RwTxnState::Active(t) => t,
            _ => panic!("txn not active"),
        }
    }

    pub fn put(
        &mut self,
        database: Database,
        key: &[u8],
        data: &[u8],
        flags: WriteFlags,
    ) -> lmdb::Result<()> {
        self.rw_txn_mut().put(database, &key, &data, flags)
    }

    pub fn delete(
        &mut self,
        database: Database,
        key: &[u8],
        flags: Option<&[u8]>,
    ) -> lmdb::Result<()> {
        self.rw_txn_mut().del(database, &key, flags)
    }

    pub fn clear_db(&mut self, database: Database) -> lmdb::Result<()> {
        self.rw_txn_mut().clear_db(database)
    }

    pub fn renew(&mut self) {
        let t = mem::replace(&mut self.txn, RwTxnState::Transitioning);
        self.txn = match t {
            RwTxnState::Active(_) => panic!("Cannot renew active RwTransaction"),
            RwTxnState::Inactive() => RwTxnState::Active(self.env.begin_rw_txn().unwrap()),
            RwTxnState::Transitioning => unreachable!(),
        };
        self.callbacks.txn_start(self.txn_id, true);
    }

    pub fn commit(&mut self) {
        let t = mem::replace(&mut self.txn, RwTxnState::Transitioning);
        match t {
            RwTxnState::Inactive() => {}
            RwTxnState::Active(t) => {
                lmdb::Transaction::commit(t).unwrap();
                self.callbacks.txn_end(self.txn_id, true);
            }
            RwTxnState::Transitioning => unreachable!(),
        };
        self.txn = RwTxnState::Inactive();
    }
}

impl Drop for LmdbWriteTransaction {
    fn drop(&mut self) {
        self.commit();
    }
}

impl Transaction for LmdbWriteTransaction {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn refresh(&mut self) {
        self.commit();
        self.renew();
    }
}

pub fn exists(txn: &dyn Transaction, db: Database, key: &[u8]) -> bool {
    match get(txn, db, &key) {
        Ok(_) => true,
        Err(lmdb::Error::NotFound) => false,
        Err(e) => panic!("exists failed: {:?}", e),
    }
}

pub fn get<'a, K: AsRef<[u8]>>(
    txn: &'a dyn Transaction,
    database: Database,
    key: &K,
) -> lmdb::Result<&'a [u8]> {
    let any = txn.as_any();
    if let Some(t) = any.downcast_ref::<LmdbWriteTransaction>() {
        lmdb::Transaction::get(t.rw_txn(), database, key)
    } else {
        lmdb::Transaction::get(
            any.downcast_ref::<LmdbReadTransaction>().unwrap().txn(),
            database,
            key,
        )
    }
}

pub fn open_ro_cursor<'a>(
    txn: &'a dyn Transaction,
    database: Database,
) -> lmdb::Result<RoCursor<'a>> {
    let any = txn.as_any();
    if let Some(t) = any.downcast_ref::<LmdbWriteTransaction>() {
        lmdb::Transaction::open_ro_cursor(t.rw_txn(), database)
    } else {
        lmdb::Transaction::open_ro_cursor(
            any.downcast_ref::<LmdbReadTransaction>().unwrap().txn(),
            database,
        )
    }
}

pub fn count(txn: &dyn Transaction, database: Database) -> u64 {
    let any = txn.as_any();
    let stat = if let Some(t) = any.downcast_ref::<LmdbWriteTransaction>() {
        lmdb::Transaction::stat(t.rw_txn(), database)
    } else {
        lmdb::Transaction::stat(
            any.downcast_ref::<LmdbReadTransaction>().unwrap().txn(),
            database,
        )
    };
    stat.unwrap().entries() as u64
}

pub const STORE_VERSION_MINIMUM: i32 = 14;
pub const STORE_VERSION_CURRENT: i32 = 18;
