use crate::{LmdbEnv, LmdbWriteTransaction, Transaction};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::StreamAdapter,
    Account, BlockHash, RawKey, Vote,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Write-through cache for the vote sequences this node hands out. Reads
/// prefer the cache; `flush` persists the dirty entries inside the
/// caller's write transaction.
pub struct LmdbVoteStore {
    _env: Arc<LmdbEnv>,
    database: Database,
    cache: Mutex<HashMap<Account, Vote>>,
}

impl LmdbVoteStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let database = env
            .environment
            .create_db(Some("vote"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            database,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn current(&self, txn: &dyn Transaction, account: &Account) -> Option<Vote> {
        let cache = self.cache.lock().unwrap();
        match cache.get(account) {
            Some(vote) => Some(vote.clone()),
            None => self.disk_get(txn, account),
        }
    }

    /// Creates the next vote in this account's sequence. The first vote of
    /// an account has sequence 1.
    pub fn generate(
        &self,
        txn: &dyn Transaction,
        account: &Account,
        prv: &RawKey,
        hashes: Vec<BlockHash>,
    ) -> Vote {
        let mut cache = self.cache.lock().unwrap();
        let current_sequence = match cache.get(account) {
            Some(vote) => Some(vote.sequence),
            None => self.disk_get(txn, account).map(|vote| vote.sequence),
        };
        let vote = Vote::new(
            *account,
            prv,
            current_sequence.unwrap_or_default() + 1,
            hashes,
        );
        cache.insert(*account, vote.clone());
        vote
    }

    /// Returns the vote with the highest sequence for this account,
    /// keeping the given one if it wins
    pub fn max(&self, txn: &dyn Transaction, vote: &Vote) -> Vote {
        let mut cache = self.cache.lock().unwrap();
        let current_sequence = match cache.get(&vote.voting_account) {
            Some(current) => Some(current.sequence),
            None => self
                .disk_get(txn, &vote.voting_account)
                .map(|current| current.sequence),
        };
        match current_sequence {
            Some(sequence) if sequence > vote.sequence => {
                // the stored vote wins; cache stays as it is
                cache
                    .get(&vote.voting_account)
                    .cloned()
                    .unwrap_or_else(|| vote.clone())
            }
            _ => {
                cache.insert(vote.voting_account, vote.clone());
                vote.clone()
            }
        }
    }

    /// Writes the cached votes through to disk. Must run inside the write
    /// transaction that observes the cached state.
    pub fn flush(&self, txn: &mut LmdbWriteTransaction) {
        let mut cache = self.cache.lock().unwrap();
        for (account, vote) in cache.drain() {
            txn.put(
                self.database,
                account.as_bytes(),
                &vote.to_bytes(),
                WriteFlags::empty(),
            )
            .unwrap();
        }
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        crate::count(txn, self.database)
    }

    fn disk_get(&self, txn: &dyn Transaction, account: &Account) -> Option<Vote> {
        match crate::get(txn, self.database, account.as_bytes()) {
            Ok(bytes) => {
                let mut stream = StreamAdapter::new(bytes);
                Vote::deserialize(&mut stream).ok()
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => panic!("Could not load vote: {:?}", e),
        }
    }
}
