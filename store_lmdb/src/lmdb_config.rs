#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SyncStrategy {
    /// Always flush to disk on commit. This is default.
    Always,

    /// Do not flush meta data eagerly. This may cause loss of transactions,
    /// but maintains integrity.
    NosyncSafe,

    /// Let the OS decide when to flush to disk. On filesystems with write
    /// ordering this has the same guarantees as nosync_safe, otherwise
    /// corruption may occur on system crash.
    NosyncUnsafe,

    /// Use a writeable memory map. Let the OS decide when to flush to disk,
    /// and make the request asynchronous. This may give a performance
    /// boost on filesystems where write ordering is not guaranteed.
    NosyncUnsafeLargeMemory,
}

#[derive(Clone, Debug)]
pub struct LmdbConfig {
    pub sync: SyncStrategy,
    pub max_databases: u32,
    pub map_size: usize,
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            sync: SyncStrategy::Always,
            max_databases: 128,
            map_size: 256 * 1024 * 1024 * 1024,
        }
    }
}
