#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate num_derive;

mod block_insertion;
mod block_rollback;

mod bootstrap_weights;
pub use bootstrap_weights::deserialize_bootstrap_weights;

mod generate_cache;
pub use generate_cache::GenerateCache;

mod ledger;
pub use ledger::{Ledger, LedgerObserver, NullLedgerObserver};

mod ledger_cache;
pub use ledger_cache::LedgerCache;

mod ledger_constants;
pub use ledger_constants::{
    LedgerConstants, DEV_GENESIS, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH, LEDGER_CONSTANTS_STUB,
};

mod rep_weights;
pub use rep_weights::RepWeights;

mod unchecked_map;
pub use unchecked_map::UncheckedMap;

mod write_database_queue;
pub use write_database_queue::{WriteDatabaseQueue, WriteGuard, Writer};

#[cfg(test)]
mod ledger_tests;

/// Outcome of submitting a block to the ledger. Everything except
/// `Progress` leaves the store untouched.
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive)]
pub enum ProcessResult {
    /// Hasn't been seen before, signed correctly
    Progress,
    /// Already seen and was valid
    Old,
    /// Block marked as previous is unknown
    GapPrevious,
    /// Block marked as source is unknown
    GapSource,
    /// One or more signatures are invalid
    BadSignature,
    /// Malicious attempt to spend a negative amount
    NegativeSpend,
    /// Source block doesn't exist, has already been received or is not
    /// receivable by this block kind
    Unreceivable,
    /// A different block already occupies this slot in the account chain
    Fork,
    /// Block attempts to open the burn account
    OpenedBurnAccount,
    /// Balance and amount delta don't match
    BalanceMismatch,
    /// Representative is changed when it is not allowed
    RepresentativeMismatch,
    /// This block cannot follow the previous block
    BlockPosition,
    /// The proof of work is too weak
    InsufficientWork,
}
