use crate::{
    LmdbConfig, LmdbReadTransaction, LmdbWriteTransaction, NullTransactionTracker, SyncStrategy,
    TransactionTracker,
};
use lmdb::{Environment, EnvironmentFlags};
use std::{
    ops::Deref,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

#[derive(Clone, Debug)]
pub struct EnvOptions {
    pub config: LmdbConfig,
    pub use_no_mem_init: bool,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            config: LmdbConfig::default(),
            use_no_mem_init: true,
        }
    }
}

pub struct LmdbEnv {
    pub environment: Environment,
    next_txn_id: AtomicU64,
    txn_tracker: Arc<dyn TransactionTracker>,
}

impl LmdbEnv {
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::with_options(path, &EnvOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: &EnvOptions) -> anyhow::Result<Self> {
        Self::with_txn_tracker(path, options, Arc::new(NullTransactionTracker::new()))
    }

    pub fn with_txn_tracker(
        path: impl AsRef<Path>,
        options: &EnvOptions,
        txn_tracker: Arc<dyn TransactionTracker>,
    ) -> anyhow::Result<Self> {
        let environment = Self::init(path.as_ref(), options)?;
        Ok(Self {
            environment,
            next_txn_id: AtomicU64::new(0),
            txn_tracker,
        })
    }

    fn init(path: &Path, options: &EnvOptions) -> anyhow::Result<Environment> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut environment_flags =
            EnvironmentFlags::NO_SUB_DIR | EnvironmentFlags::NO_TLS | EnvironmentFlags::NO_READAHEAD;

        match options.config.sync {
            SyncStrategy::Always => {}
            SyncStrategy::NosyncSafe => environment_flags |= EnvironmentFlags::NO_META_SYNC,
            SyncStrategy::NosyncUnsafe => environment_flags |= EnvironmentFlags::NO_SYNC,
            SyncStrategy::NosyncUnsafeLargeMemory => {
                environment_flags |= EnvironmentFlags::NO_SYNC
                    | EnvironmentFlags::WRITE_MAP
                    | EnvironmentFlags::MAP_ASYNC
            }
        }

        if options.use_no_mem_init {
            environment_flags |= EnvironmentFlags::NO_MEM_INIT;
        }

        let environment = Environment::new()
            .set_max_dbs(options.config.max_databases)
            .set_map_size(options.config.map_size)
            .set_flags(environment_flags)
            .open_with_permissions(path, 0o600)?;

        Ok(environment)
    }

    pub fn tx_begin_read(&self) -> LmdbReadTransaction {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        LmdbReadTransaction::new(txn_id, &self.environment, self.txn_tracker.clone())
            .expect("Could not create LMDB read-only transaction")
    }

    pub fn tx_begin_write(&self) -> LmdbWriteTransaction {
        // For IO threads, we do not want them to block on creating write
        // transactions.
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        LmdbWriteTransaction::new(txn_id, &self.environment, self.txn_tracker.clone())
            .expect("Could not create LMDB read-write transaction")
    }
}

pub struct TestDbFile {
    pub path: PathBuf,
}

impl TestDbFile {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: std::env::temp_dir().join(path),
        }
    }

    pub fn random() -> Self {
        Self::new(Self::temp_file_name())
    }

    fn temp_file_name() -> PathBuf {
        PathBuf::from(format!("{}.ldb", uuid::Uuid::new_v4().simple()))
    }

    fn lock_file_path(&self) -> PathBuf {
        let mut lock_file_path = self.path.parent().unwrap().to_owned();
        let mut fname = self.path.file_name().unwrap().to_os_string();
        fname.push("-lock");
        lock_file_path.push(fname);
        lock_file_path
    }
}

impl Drop for TestDbFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = std::fs::remove_file(&self.path);
            let _ = std::fs::remove_file(self.lock_file_path());
        }
    }
}

pub struct TestLmdbEnv {
    env: Arc<LmdbEnv>,
    _file: TestDbFile,
}

impl TestLmdbEnv {
    pub fn new() -> Self {
        let file = TestDbFile::random();
        let env = Arc::new(LmdbEnv::new(&file.path).unwrap());
        Self { env, _file: file }
    }

    pub fn env(&self) -> Arc<LmdbEnv> {
        self.env.clone()
    }
}

impl Default for TestLmdbEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestLmdbEnv {
    type Target = LmdbEnv;

    fn deref(&self) -> &Self::Target {
        &self.env
    }
}
