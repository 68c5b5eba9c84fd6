use crate::{
    EnvOptions, LmdbAccountStore, LmdbBlockStore, LmdbConfirmationHeightStore, LmdbEnv,
    LmdbFrontierStore, LmdbIteratorImpl, LmdbOnlineWeightStore, LmdbPeerStore, LmdbPendingStore,
    LmdbReadTransaction, LmdbUncheckedStore, LmdbVersionStore, LmdbVoteStore,
    LmdbWriteTransaction, NullTransactionTracker, Table, TransactionTracker,
    STORE_VERSION_CURRENT, STORE_VERSION_MINIMUM,
};
use lmdb::{Database, DatabaseFlags, WriteFlags};
use rsbtcnew_core::{
    utils::{seconds_since_epoch, Deserialize, StreamAdapter},
    Account, AccountInfo, Amount, BlockDetails, BlockHash, BlockType, ChangeBlock,
    ConfirmationHeightInfo, Epoch, Epochs, OpenBlock, PendingInfo, ReceiveBlock, StateBlock,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// The durable store. One LMDB environment with one named table per data
/// set; a single write transaction at a time, any number of read
/// snapshots.
pub struct LmdbStore {
    pub env: Arc<LmdbEnv>,
    pub block: Arc<LmdbBlockStore>,
    pub account: Arc<LmdbAccountStore>,
    pub pending: Arc<LmdbPendingStore>,
    pub frontier: Arc<LmdbFrontierStore>,
    pub confirmation_height: Arc<LmdbConfirmationHeightStore>,
    pub unchecked: Arc<LmdbUncheckedStore>,
    pub peer: Arc<LmdbPeerStore>,
    pub online_weight: Arc<LmdbOnlineWeightStore>,
    pub vote: Arc<LmdbVoteStore>,
    pub version: Arc<LmdbVersionStore>,
}

impl LmdbStore {
    pub fn open(path: &Path) -> LmdbStoreBuilder<'_> {
        LmdbStoreBuilder::new(path)
    }

    pub fn tx_begin_read(&self) -> LmdbReadTransaction {
        self.env.tx_begin_read()
    }

    pub fn tx_begin_write(&self) -> LmdbWriteTransaction {
        self.env.tx_begin_write()
    }

    /// Callers name the tables they intend to write and the tables whose
    /// writers must be blocked. The LMDB backend has a single environment
    /// wide writer, so the hints do not change locking granularity here.
    pub fn tx_begin_write_for(
        &self,
        _tables_to_lock: &[Table],
        _tables_no_lock: &[Table],
    ) -> LmdbWriteTransaction {
        self.env.tx_begin_write()
    }
}

pub struct LmdbStoreBuilder<'a> {
    path: &'a Path,
    options: EnvOptions,
    tracker: Option<Arc<dyn TransactionTracker>>,
    epochs: Epochs,
    backup_before_upgrade: bool,
}

impl<'a> LmdbStoreBuilder<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            options: EnvOptions::default(),
            tracker: None,
            epochs: Epochs::new(),
            backup_before_upgrade: false,
        }
    }

    pub fn options(mut self, options: EnvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn txn_tracker(mut self, tracker: Arc<dyn TransactionTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Schema upgrades need to know the epoch links of the network to
    /// classify historic state blocks
    pub fn epochs(mut self, epochs: Epochs) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn backup_before_upgrade(mut self, backup: bool) -> Self {
        self.backup_before_upgrade = backup;
        self
    }

    pub fn build(self) -> anyhow::Result<LmdbStore> {
        let tracker = self
            .tracker
            .unwrap_or_else(|| Arc::new(NullTransactionTracker::new()));
        let env = Arc::new(LmdbEnv::with_txn_tracker(
            self.path,
            &self.options,
            tracker,
        )?);

        let version = Arc::new(LmdbVersionStore::new(env.clone())?);
        upgrade_if_needed(
            self.path,
            &env,
            &version,
            &self.epochs,
            self.backup_before_upgrade,
        )?;

        Ok(LmdbStore {
            block: Arc::new(LmdbBlockStore::new(env.clone())?),
            account: Arc::new(LmdbAccountStore::new(env.clone())?),
            pending: Arc::new(LmdbPendingStore::new(env.clone())?),
            frontier: Arc::new(LmdbFrontierStore::new(env.clone())?),
            confirmation_height: Arc::new(LmdbConfirmationHeightStore::new(env.clone())?),
            unchecked: Arc::new(LmdbUncheckedStore::new(env.clone())?),
            peer: Arc::new(LmdbPeerStore::new(env.clone())?),
            online_weight: Arc::new(LmdbOnlineWeightStore::new(env.clone())?),
            vote: Arc::new(LmdbVoteStore::new(env.clone())?),
            version,
            env,
        })
    }
}

fn upgrade_if_needed(
    path: &Path,
    env: &Arc<LmdbEnv>,
    version_store: &LmdbVersionStore,
    epochs: &Epochs,
    backup_before_upgrade: bool,
) -> anyhow::Result<()> {
    let current_version = {
        let txn = env.tx_begin_read();
        version_store.get(&txn)
    };

    let mut version = match current_version {
        None => {
            // fresh database
            let mut txn = env.tx_begin_write();
            version_store.put(&mut txn, STORE_VERSION_CURRENT);
            return Ok(());
        }
        Some(version) => version,
    };

    if version > STORE_VERSION_CURRENT {
        bail!(
            "The version of the ledger ({}) is too high for this node. Downgrades are not supported",
            version
        );
    }

    if version < STORE_VERSION_MINIMUM {
        bail!(
            "The version of the ledger ({}) is lower than the minimum ({}) which can be upgraded. \
             Please upgrade with a v19 node first",
            version,
            STORE_VERSION_MINIMUM
        );
    }

    if version == STORE_VERSION_CURRENT {
        return Ok(());
    }

    if backup_before_upgrade {
        create_backup_file(path)?;
    }

    info!(
        "upgrade in progress from store version {} to {}",
        version, STORE_VERSION_CURRENT
    );

    while version < STORE_VERSION_CURRENT {
        match version {
            14 => upgrade_v14_to_v15(env, version_store, epochs)?,
            15 => upgrade_v15_to_v16(env, version_store)?,
            // v16 -> v17 and v17 -> v18 only added node configuration
            // fields, no data migration
            16 | 17 => {
                let mut txn = env.tx_begin_write();
                version_store.put(&mut txn, version + 1);
            }
            _ => unreachable!("no upgrade path from version {}", version),
        }
        version += 1;
        info!("store upgraded to version {}", version);
    }

    Ok(())
}

/// Copies the data file to a timestamped sibling before the first upgrade
/// write
pub fn create_backup_file(path: &Path) -> anyhow::Result<PathBuf> {
    let file_name = path
        .file_stem()
        .ok_or_else(|| anyhow!("invalid store path"))?
        .to_string_lossy();
    let backup_path = path.with_file_name(format!(
        "{}_backup_{}.ldb",
        file_name,
        seconds_since_epoch()
    ));
    info!("backing up store to {:?}", backup_path);
    std::fs::copy(path, &backup_path)?;
    Ok(backup_path)
}

/// Account info layout before v15: the confirmation height was the last
/// field of the account row and the row's epoch was given by the table it
/// lived in
struct AccountInfoV14 {
    head: BlockHash,
    representative: Account,
    open_block: BlockHash,
    balance: Amount,
    modified: u64,
    block_count: u64,
    confirmation_height: u64,
}

impl AccountInfoV14 {
    fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut stream = StreamAdapter::new(bytes);
        Ok(Self {
            head: BlockHash::deserialize(&mut stream)?,
            representative: Account::deserialize(&mut stream)?,
            open_block: BlockHash::deserialize(&mut stream)?,
            balance: Amount::deserialize(&mut stream)?,
            modified: rsbtcnew_core::utils::Stream::read_u64_be(&mut stream)?,
            block_count: rsbtcnew_core::utils::Stream::read_u64_be(&mut stream)?,
            confirmation_height: rsbtcnew_core::utils::Stream::read_u64_be(&mut stream)?,
        })
    }
}

/// Moves confirmation heights into their own table, collapses the epoch 1
/// block and pending tables into the unified ones and rewrites state
/// sidebands to carry their epoch
fn upgrade_v14_to_v15(
    env: &Arc<LmdbEnv>,
    version_store: &LmdbVersionStore,
    epochs: &Epochs,
) -> anyhow::Result<()> {
    info!("upgrading store from v14 to v15");
    // all tables have to be opened before the write transaction starts,
    // since create_db takes its own transaction
    let accounts_db = env
        .environment
        .create_db(Some("accounts"), DatabaseFlags::empty())?;
    let confirmation_height_db = env
        .environment
        .create_db(Some("confirmation_height"), DatabaseFlags::empty())?;
    let pending_db = env
        .environment
        .create_db(Some("pending"), DatabaseFlags::empty())?;
    let state_db = env
        .environment
        .create_db(Some("state_blocks"), DatabaseFlags::empty())?;
    let accounts_v1_db = env.environment.open_db(Some("accounts_v1")).ok();
    let pending_v1_db = env.environment.open_db(Some("pending_v1")).ok();
    let state_v1_db = env.environment.open_db(Some("state_blocks_v1")).ok();
    let block_tables = block_tables(env)?;
    let representation_db = env.environment.open_db(Some("representation")).ok();

    let txn = &mut env.tx_begin_write();

    // 1. state blocks: merge the epoch 1 table into the unified one and
    // append details and source epoch to every sideband
    let mut state_rows = collect_raw(txn, state_db);
    state_rows.extend(collect_raw_opt(txn, state_v1_db));
    for (key, mut value) in state_rows {
        let epoch = match state_v1_db {
            Some(db) if crate::exists(txn, db, &key) => Epoch::Epoch1,
            _ => Epoch::Epoch0,
        };
        let details = state_block_details(txn, &block_tables, &value, epoch, epochs)?;
        value.push(details.packed());
        value.push(Epoch::Epoch0 as u8); // source epoch was not recorded before v15
        txn.put(state_db, &key, &value, WriteFlags::empty())?;
    }
    if let Some(db) = state_v1_db {
        unsafe { txn.rw_txn_mut().drop_db(db)? };
    }

    // 2. pending: append the epoch to every row, epoch 1 rows come from
    // the dedicated table
    let base_pending = collect_raw(txn, pending_db);
    for (key, value) in base_pending {
        let info = pending_info_v14(&value, Epoch::Epoch0)?;
        txn.put(pending_db, &key, &info.to_bytes(), WriteFlags::empty())?;
    }
    for (key, value) in collect_raw_opt(txn, pending_v1_db) {
        let info = pending_info_v14(&value, Epoch::Epoch1)?;
        txn.put(pending_db, &key, &info.to_bytes(), WriteFlags::empty())?;
    }
    if let Some(db) = pending_v1_db {
        unsafe { txn.rw_txn_mut().drop_db(db)? };
    }

    // 3. accounts: split off the confirmation height, merge epoch 1
    // accounts and store the epoch in the row itself
    let mut account_rows: Vec<(Vec<u8>, Vec<u8>, Epoch)> = collect_raw(txn, accounts_db)
        .into_iter()
        .map(|(k, v)| (k, v, Epoch::Epoch0))
        .collect();
    account_rows.extend(
        collect_raw_opt(txn, accounts_v1_db)
            .into_iter()
            .map(|(k, v)| (k, v, Epoch::Epoch1)),
    );
    for (key, value, epoch) in account_rows {
        let v14 = AccountInfoV14::from_bytes(&value)?;
        let account = Account::from_slice(&key).ok_or_else(|| anyhow!("corrupted account key"))?;
        let info = AccountInfo {
            head: v14.head,
            representative: v14.representative,
            open_block: v14.open_block,
            balance: v14.balance,
            modified: v14.modified,
            block_count: v14.block_count,
            epoch,
        };
        let frontier = confirmed_frontier(txn, &block_tables, &v14)?;
        txn.put(accounts_db, &key, &info.to_bytes(), WriteFlags::empty())?;
        txn.put(
            confirmation_height_db,
            account.as_bytes(),
            &ConfirmationHeightInfo::new(v14.confirmation_height, frontier).to_bytes(),
            WriteFlags::empty(),
        )?;
    }
    if let Some(db) = accounts_v1_db {
        unsafe { txn.rw_txn_mut().drop_db(db)? };
    }

    // 4. the representation table is derived state and goes away
    if let Some(db) = representation_db {
        unsafe { txn.rw_txn_mut().drop_db(db)? };
    }

    version_store.put(txn, 15);
    Ok(())
}

/// Cleans up table remnants a v15 store may still carry
fn upgrade_v15_to_v16(
    env: &Arc<LmdbEnv>,
    version_store: &LmdbVersionStore,
) -> anyhow::Result<()> {
    info!("upgrading store from v15 to v16");
    let representation_db = env.environment.open_db(Some("representation")).ok();
    let txn = &mut env.tx_begin_write();
    if let Some(db) = representation_db {
        unsafe { txn.rw_txn_mut().drop_db(db)? };
    }
    version_store.put(txn, 16);
    Ok(())
}

fn collect_raw(txn: &LmdbWriteTransaction, db: Database) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rows = Vec::new();
    let mut it = LmdbIteratorImpl::new(txn, db, None, true);
    while let Some((key, value)) = it.current() {
        rows.push((key.to_vec(), value.to_vec()));
        it.next();
    }
    rows
}

fn collect_raw_opt(txn: &LmdbWriteTransaction, db: Option<Database>) -> Vec<(Vec<u8>, Vec<u8>)> {
    match db {
        Some(db) => collect_raw(txn, db),
        None => Vec::new(),
    }
}

fn pending_info_v14(bytes: &[u8], epoch: Epoch) -> anyhow::Result<PendingInfo> {
    if bytes.len() < 48 {
        bail!("corrupted pending row");
    }
    let mut stream = StreamAdapter::new(bytes);
    let source = Account::deserialize(&mut stream)?;
    let amount = Amount::deserialize(&mut stream)?;
    Ok(PendingInfo::new(source, amount, epoch))
}

struct BlockTables {
    tables: [(Database, BlockType); 5],
}

fn block_tables(env: &Arc<LmdbEnv>) -> anyhow::Result<BlockTables> {
    Ok(BlockTables {
        tables: [
            (
                env.environment
                    .create_db(Some("send"), DatabaseFlags::empty())?,
                BlockType::LegacySend,
            ),
            (
                env.environment
                    .create_db(Some("receive"), DatabaseFlags::empty())?,
                BlockType::LegacyReceive,
            ),
            (
                env.environment
                    .create_db(Some("open"), DatabaseFlags::empty())?,
                BlockType::LegacyOpen,
            ),
            (
                env.environment
                    .create_db(Some("change"), DatabaseFlags::empty())?,
                BlockType::LegacyChange,
            ),
            (
                env.environment
                    .create_db(Some("state_blocks"), DatabaseFlags::empty())?,
                BlockType::State,
            ),
        ],
    })
}

fn find_block_raw<'a>(
    txn: &'a dyn crate::Transaction,
    tables: &BlockTables,
    hash: &BlockHash,
) -> Option<(BlockType, &'a [u8])> {
    for (db, block_type) in tables.tables {
        match crate::get(txn, db, hash.as_bytes()) {
            Ok(bytes) => return Some((block_type, bytes)),
            Err(lmdb::Error::NotFound) => {}
            Err(e) => panic!("Could not read block during upgrade: {:?}", e),
        }
    }
    None
}

/// Balance established by the block with the given hash, readable without
/// knowing the sideband version
fn raw_balance(
    txn: &dyn crate::Transaction,
    tables: &BlockTables,
    hash: &BlockHash,
) -> anyhow::Result<Amount> {
    let Some((block_type, bytes)) = find_block_raw(txn, tables, hash) else {
        bail!("missing block during upgrade: {}", hash);
    };
    let balance_offset = match block_type {
        // balance inside the block itself
        BlockType::LegacySend => 1 + 64,
        BlockType::State => 1 + 96,
        // balance recorded in the sideband
        BlockType::LegacyReceive => 1 + ReceiveBlock::serialized_size() + 32 + 32 + 8,
        BlockType::LegacyChange => 1 + ChangeBlock::serialized_size() + 32 + 32 + 8,
        BlockType::LegacyOpen => 1 + OpenBlock::serialized_size() + 32,
        _ => bail!("invalid block type during upgrade"),
    };
    let mut balance_bytes = [0u8; 16];
    balance_bytes.copy_from_slice(&bytes[balance_offset..balance_offset + 16]);
    Ok(Amount::from_be_bytes(balance_bytes))
}

/// Works out the details byte a pre-v15 state block sideband was missing
fn state_block_details(
    txn: &dyn crate::Transaction,
    tables: &BlockTables,
    row: &[u8],
    epoch: Epoch,
    epochs: &Epochs,
) -> anyhow::Result<BlockDetails> {
    let mut stream = StreamAdapter::new(&row[1..]);
    let block = StateBlock::deserialize(&mut stream)?;
    let previous_balance = if block.hashables.previous.is_zero() {
        Amount::zero()
    } else {
        raw_balance(txn, tables, &block.hashables.previous)?
    };
    let is_epoch = epochs.is_epoch_link(&block.hashables.link);
    let is_send = block.hashables.balance < previous_balance;
    let is_receive = !is_send && !is_epoch && !block.hashables.link.is_zero();
    Ok(BlockDetails::new(epoch, is_send, is_receive, is_epoch))
}

/// Follows successors from the open block to find the hash at the
/// confirmed height
fn confirmed_frontier(
    txn: &dyn crate::Transaction,
    tables: &BlockTables,
    info: &AccountInfoV14,
) -> anyhow::Result<BlockHash> {
    if info.confirmation_height == 0 {
        return Ok(BlockHash::zero());
    }
    if info.confirmation_height == info.block_count {
        return Ok(info.head);
    }
    let mut hash = info.open_block;
    for _ in 1..info.confirmation_height {
        let Some((block_type, bytes)) = find_block_raw(txn, tables, &hash) else {
            bail!("missing block during upgrade: {}", hash);
        };
        let successor_offset = 1 + rsbtcnew_core::serialized_block_size(block_type);
        hash = BlockHash::from_slice(&bytes[successor_offset..successor_offset + 32])
            .ok_or_else(|| anyhow!("corrupted sideband"))?;
    }
    Ok(hash)
}
