use crate::{LmdbEnv, LmdbIteratorImpl, LmdbWriteTransaction, Transaction};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rand::RngExt;
use rsbtcnew_core::{
    serialized_block_size, Account, Amount, Block, BlockEnum, BlockHash, BlockType, Epoch,
};
use std::sync::Arc;

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct BlockCounts {
    pub send: u64,
    pub receive: u64,
    pub open: u64,
    pub change: u64,
    pub state: u64,
}

impl BlockCounts {
    pub fn sum(&self) -> u64 {
        self.send + self.receive + self.open + self.change + self.state
    }
}

const BLOCK_TYPES: [BlockType; 5] = [
    BlockType::LegacySend,
    BlockType::LegacyReceive,
    BlockType::LegacyOpen,
    BlockType::LegacyChange,
    BlockType::State,
];

pub struct LmdbBlockStore {
    _env: Arc<LmdbEnv>,
    send_blocks: Database,
    receive_blocks: Database,
    open_blocks: Database,
    change_blocks: Database,
    state_blocks: Database,
}

impl LmdbBlockStore {
    pub fn new(env: Arc<LmdbEnv>) -> anyhow::Result<Self> {
        let send_blocks = env
            .environment
            .create_db(Some("send"), DatabaseFlags::empty())?;
        let receive_blocks = env
            .environment
            .create_db(Some("receive"), DatabaseFlags::empty())?;
        let open_blocks = env
            .environment
            .create_db(Some("open"), DatabaseFlags::empty())?;
        let change_blocks = env
            .environment
            .create_db(Some("change"), DatabaseFlags::empty())?;
        let state_blocks = env
            .environment
            .create_db(Some("state_blocks"), DatabaseFlags::empty())?;
        Ok(Self {
            _env: env,
            send_blocks,
            receive_blocks,
            open_blocks,
            change_blocks,
            state_blocks,
        })
    }

    pub fn database(&self, block_type: BlockType) -> Database {
        match block_type {
            BlockType::LegacySend => self.send_blocks,
            BlockType::LegacyReceive => self.receive_blocks,
            BlockType::LegacyOpen => self.open_blocks,
            BlockType::LegacyChange => self.change_blocks,
            BlockType::State => self.state_blocks,
            BlockType::Invalid | BlockType::NotABlock => {
                panic!("invalid block type")
            }
        }
    }

    /// The caller must have established that no block with this hash is
    /// stored yet and that the predecessor (if any) is stored
    pub fn put(&self, txn: &mut LmdbWriteTransaction, block: &BlockEnum) {
        debug_assert!(block.sideband().is_some(), "sideband not set");
        let hash = block.hash();
        self.raw_put(
            txn,
            &block.serialize_with_sideband(),
            &hash,
            self.database(block.block_type()),
        );
        let predecessor = block.previous();
        if !predecessor.is_zero() {
            self.set_successor(txn, &predecessor, &hash);
        }
    }

    /// Threads the successor pointer of a stored block
    pub fn set_successor(
        &self,
        txn: &mut LmdbWriteTransaction,
        hash: &BlockHash,
        successor: &BlockHash,
    ) {
        let (block_type, bytes) = self
            .block_raw_get(txn, hash)
            .expect("predecessor not found while setting successor");
        let mut data = bytes.to_vec();
        let offset = Self::successor_offset(block_type);
        data[offset..offset + 32].copy_from_slice(successor.as_bytes());
        self.raw_put(txn, &data, hash, self.database(block_type));
    }

    pub fn raw_put(
        &self,
        txn: &mut LmdbWriteTransaction,
        data: &[u8],
        hash: &BlockHash,
        database: Database,
    ) {
        txn.put(database, hash.as_bytes(), data, WriteFlags::empty())
            .unwrap();
    }

    pub fn exists(&self, txn: &dyn Transaction, hash: &BlockHash) -> bool {
        self.block_raw_get(txn, hash).is_some()
    }

    pub fn get(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<BlockEnum> {
        let (_, bytes) = self.block_raw_get(txn, hash)?;
        let block = BlockEnum::deserialize_with_sideband(bytes)
            .expect("Could not deserialize block from database");
        Some(block)
    }

    pub fn del(&self, txn: &mut LmdbWriteTransaction, hash: &BlockHash) {
        let database = match self.block_raw_get(txn, hash) {
            Some((block_type, _)) => self.database(block_type),
            None => return,
        };
        txn.delete(database, hash.as_bytes(), None).unwrap();
    }

    pub fn successor(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<BlockHash> {
        let (block_type, bytes) = self.block_raw_get(txn, hash)?;
        let offset = Self::successor_offset(block_type);
        let successor = BlockHash::from_slice(&bytes[offset..offset + 32]).unwrap();
        if successor.is_zero() {
            None
        } else {
            Some(successor)
        }
    }

    pub fn successor_clear(&self, txn: &mut LmdbWriteTransaction, hash: &BlockHash) {
        let (block_type, bytes) = self
            .block_raw_get(txn, hash)
            .expect("block not found while clearing successor");
        let mut data = bytes.to_vec();
        let offset = Self::successor_offset(block_type);
        data[offset..offset + 32].fill(0);
        self.raw_put(txn, &data, hash, self.database(block_type));
    }

    pub fn counts(&self, txn: &dyn Transaction) -> BlockCounts {
        BlockCounts {
            send: crate::count(txn, self.send_blocks),
            receive: crate::count(txn, self.receive_blocks),
            open: crate::count(txn, self.open_blocks),
            change: crate::count(txn, self.change_blocks),
            state: crate::count(txn, self.state_blocks),
        }
    }

    pub fn count(&self, txn: &dyn Transaction) -> u64 {
        self.counts(txn).sum()
    }

    pub fn random(&self, txn: &dyn Transaction) -> Option<BlockEnum> {
        let counts = self.counts(txn);
        let total = counts.sum();
        if total == 0 {
            return None;
        }

        // pick a table weighted by its entry count, then a random position
        // inside the key space of that table
        let mut target = rand::rng().random_range(0..total);
        let mut database = self.state_blocks;
        for block_type in BLOCK_TYPES {
            let entries = match block_type {
                BlockType::LegacySend => counts.send,
                BlockType::LegacyReceive => counts.receive,
                BlockType::LegacyOpen => counts.open,
                BlockType::LegacyChange => counts.change,
                _ => counts.state,
            };
            if target < entries {
                database = self.database(block_type);
                break;
            }
            target -= entries;
        }

        let mut target_key = [0u8; 32];
        rand::rng().fill(&mut target_key[..]);
        let mut iterator = LmdbIteratorImpl::new(txn, database, Some(&target_key), true);
        if iterator.current().is_none() {
            iterator = LmdbIteratorImpl::new(txn, database, None, true);
        }
        let (key, _) = iterator.current()?;
        let hash = BlockHash::from_slice(key).unwrap();
        self.get(txn, &hash)
    }

    pub fn balance(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Amount> {
        self.get(txn, hash).map(|block| block.balance_calculated())
    }

    /// The epoch the block was committed under
    pub fn version(&self, txn: &dyn Transaction, hash: &BlockHash) -> Epoch {
        self.get(txn, hash)
            .map(|block| block.sideband().unwrap().details.epoch)
            .unwrap_or(Epoch::Epoch0)
    }

    /// Height of the block in its account chain, 0 if the block is not
    /// stored
    pub fn account_height(&self, txn: &dyn Transaction, hash: &BlockHash) -> u64 {
        self.get(txn, hash)
            .map(|block| block.sideband().unwrap().height)
            .unwrap_or_default()
    }

    pub fn account(&self, txn: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        self.get(txn, hash).map(|block| block.account_calculated())
    }

    fn block_raw_get<'a>(
        &self,
        txn: &'a dyn Transaction,
        hash: &BlockHash,
    ) -> Option<(BlockType, &'a [u8])> {
        for block_type in BLOCK_TYPES {
            match crate::get(txn, self.database(block_type), hash.as_bytes()) {
                Ok(bytes) => return Some((block_type, bytes)),
                Err(lmdb::Error::NotFound) => {}
                Err(e) => panic!("Could not read block: {:?}", e),
            }
        }
        None
    }

    // type byte and block body come before the sideband, which starts with
    // the successor hash
    fn successor_offset(block_type: BlockType) -> usize {
        1 + serialized_block_size(block_type)
    }
}
