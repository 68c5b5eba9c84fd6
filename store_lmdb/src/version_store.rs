use crate::{LmdbEnv, LmdbWriteTransaction, Transaction};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use std::sync::Arc;

pub struct LmdbVersionStore {
    _env: Arc<LmdbEnv>,

    /// U256 (arbitrary key) -> blob
    database: Database,
}

impl LmdbVersionStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("meta"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn put(&self, txn: &mut LmdbWriteTransaction, version: i32) {
        let key_bytes = version_key();
        let value_bytes = value_bytes(version);
        txn.put(
            self.database,
            &key_bytes,
            &value_bytes,
            WriteFlags::empty(),
        )
        .unwrap();
    }

    pub fn get(&self, txn: &dyn Transaction) -> Option<i32> {
        let key_bytes = version_key();
        match crate::get(txn, self.database, &key_bytes) {
            Ok(value) => Some(i32::from_be_bytes(value[28..].try_into().unwrap())),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Error while loading db version: {:?}", e),
        }
    }
}

fn value_bytes(version: i32) -> [u8; 32] {
    let mut value_bytes = [0; 32];
    value_bytes[28..].copy_from_slice(&version.to_be_bytes());
    value_bytes
}

fn version_key() -> [u8; 32] {
    value_bytes(1)
}
