use rsbtcnew_core::{
    utils::seconds_since_epoch, Account, Block, BlockEnum, PendingKey, SignatureVerification,
};
use rsbtcnew_store_lmdb::Transaction;

use super::BlockValidator;
use crate::Ledger;

/// Loads all the ledger state a validation run needs
pub(crate) struct BlockValidatorFactory<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
    block: &'a BlockEnum,
    verification: SignatureVerification,
}

impl<'a> BlockValidatorFactory<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a dyn Transaction,
        block: &'a BlockEnum,
        verification: SignatureVerification,
    ) -> Self {
        Self {
            ledger,
            txn,
            block,
            verification,
        }
    }

    pub(crate) fn create_validator(&self) -> BlockValidator<'a> {
        let previous_block = self.load_previous_block();
        let (account, frontier_missing) = self.resolve_account(&previous_block);
        let source = self.block.source_or_link();
        let source_block_exists =
            !source.is_zero() && self.ledger.block_exists(self.txn, &source);
        let pending_receive_info = if source.is_zero() {
            None
        } else {
            self.ledger
                .pending_info(self.txn, &PendingKey::new(account, source))
        };

        BlockValidator {
            block: self.block,
            epochs: &self.ledger.constants.epochs,
            work: &self.ledger.constants.work,
            burn_account: self.ledger.constants.burn_account,
            account,
            frontier_missing,
            block_exists: self.ledger.block_exists(self.txn, &self.block.hash()),
            old_account_info: self.ledger.account_info(self.txn, &account),
            previous_block,
            pending_receive_info,
            source_block_exists,
            verification: self.verification,
            seconds_since_epoch: seconds_since_epoch(),
        }
    }

    /// State and open blocks carry their account; the other legacy kinds
    /// get it from the frontier index, falling back to the stored
    /// predecessor for fork detection
    fn resolve_account(&self, previous_block: &Option<BlockEnum>) -> (Account, bool) {
        match self.block {
            BlockEnum::State(state) => (state.hashables.account, false),
            BlockEnum::LegacyOpen(open) => (open.hashables.account, false),
            _ => {
                match self
                    .ledger
                    .get_frontier(self.txn, &self.block.previous())
                {
                    Some(account) => (account, false),
                    None => {
                        let account = previous_block
                            .as_ref()
                            .map(|previous| previous.account_calculated())
                            .unwrap_or_default();
                        (account, true)
                    }
                }
            }
        }
    }

    fn load_previous_block(&self) -> Option<BlockEnum> {
        if !self.block.previous().is_zero() {
            self.ledger.get_block(self.txn, &self.block.previous())
        } else {
            None
        }
    }
}
