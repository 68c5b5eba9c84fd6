use crate::ProcessResult;
use rsbtcnew_core::{
    validate_message, work::WorkThresholds, Account, AccountInfo, Amount, Block, BlockDetails,
    BlockEnum, BlockSideband, ChangeBlock, Epoch, Epochs, OpenBlock, PendingInfo, PendingKey,
    PublicKey, ReceiveBlock, SendBlock, SignatureVerification, StateBlock,
};

/// Everything the inserter has to change when a block gets committed
#[derive(Debug, PartialEq)]
pub(crate) struct BlockInsertInstructions {
    pub account: Account,
    pub old_account_info: AccountInfo,
    pub set_account_info: AccountInfo,
    pub delete_pending: Option<PendingKey>,
    pub insert_pending: Option<(PendingKey, PendingInfo)>,
    pub set_sideband: BlockSideband,
    pub is_epoch_block: bool,
}

/// Decides whether a block is valid against the current ledger state. A
/// pure decision stage: all required state is loaded up front by the
/// factory, the outcome is either a result code or the full set of
/// mutations for the inserter.
pub(crate) struct BlockValidator<'a> {
    pub block: &'a BlockEnum,
    pub epochs: &'a Epochs,
    pub work: &'a WorkThresholds,
    pub burn_account: Account,
    pub block_exists: bool,
    /// The account the block belongs to. For legacy blocks this comes from
    /// the frontier index or the stored predecessor.
    pub account: Account,
    /// Set when a legacy block's predecessor is stored but is not a legacy
    /// head
    pub frontier_missing: bool,
    pub old_account_info: Option<AccountInfo>,
    pub previous_block: Option<BlockEnum>,
    /// Receivable entry for (account, source resp. link)
    pub pending_receive_info: Option<PendingInfo>,
    pub source_block_exists: bool,
    pub verification: SignatureVerification,
    pub seconds_since_epoch: u64,
}

impl<'a> BlockValidator<'a> {
    pub(crate) fn validate(&self) -> Result<BlockInsertInstructions, ProcessResult> {
        self.ensure_block_does_not_exist_yet()?;
        self.ensure_sufficient_work()?;
        match self.block {
            BlockEnum::LegacySend(send) => self.validate_legacy_send(send),
            BlockEnum::LegacyReceive(receive) => self.validate_legacy_receive(receive),
            BlockEnum::LegacyOpen(open) => self.validate_legacy_open(open),
            BlockEnum::LegacyChange(change) => self.validate_legacy_change(change),
            BlockEnum::State(state) => {
                if self.epochs.is_epoch_link(&state.hashables.link) {
                    self.validate_state_with_epoch_link(state)
                } else {
                    self.validate_state(state)
                }
            }
        }
    }

    fn validate_legacy_send(
        &self,
        send: &SendBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        let previous = self.ensure_previous_block_exists()?;
        self.ensure_valid_predecessor(previous)?;
        self.ensure_frontier_present()?;
        self.ensure_valid_signature_for(&self.account)?;
        let info = self.account_info()?;

        if info.balance < send.hashables.balance {
            return Err(ProcessResult::NegativeSpend);
        }
        let amount = info.balance - send.hashables.balance;

        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: info.representative,
            open_block: info.open_block,
            balance: send.hashables.balance,
            modified: self.seconds_since_epoch,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: info.clone(),
            set_account_info,
            delete_pending: None,
            insert_pending: Some((
                PendingKey::new(send.hashables.destination, self.block.hash()),
                PendingInfo::new(self.account, amount, Epoch::Epoch0),
            )),
            set_sideband: self.sideband(
                info.block_count + 1,
                send.hashables.balance,
                BlockDetails::new(Epoch::Epoch0, true, false, false),
                Epoch::Epoch0,
            ),
            is_epoch_block: false,
        })
    }

    fn validate_legacy_receive(
        &self,
        receive: &ReceiveBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        let previous = self.ensure_previous_block_exists()?;
        self.ensure_valid_predecessor(previous)?;
        // the predecessor is stored but is not a legacy head, so a
        // different block already occupies this slot
        if self.frontier_missing {
            return Err(ProcessResult::Fork);
        }
        self.ensure_valid_signature_for(&self.account)?;
        self.ensure_source_block_exists()?;
        let info = self.account_info()?;
        if info.head != receive.hashables.previous {
            return Err(ProcessResult::GapPrevious);
        }
        let pending = self.ensure_pending_receive()?;
        self.ensure_legacy_receivable(&pending)?;

        let new_balance = info.balance + pending.amount;
        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: info.representative,
            open_block: info.open_block,
            balance: new_balance,
            modified: self.seconds_since_epoch,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: info.clone(),
            set_account_info,
            delete_pending: Some(PendingKey::new(self.account, receive.hashables.source)),
            insert_pending: None,
            set_sideband: self.sideband(
                info.block_count + 1,
                new_balance,
                BlockDetails::new(Epoch::Epoch0, false, true, false),
                Epoch::Epoch0,
            ),
            is_epoch_block: false,
        })
    }

    fn validate_legacy_open(
        &self,
        open: &OpenBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        self.ensure_valid_signature_for(&open.hashables.account)?;
        self.ensure_source_block_exists()?;
        if self.old_account_info.is_some() {
            return Err(ProcessResult::Fork);
        }
        let pending = self.ensure_pending_receive()?;
        if open.hashables.account == self.burn_account {
            return Err(ProcessResult::OpenedBurnAccount);
        }
        self.ensure_legacy_receivable(&pending)?;

        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: open.hashables.representative,
            open_block: self.block.hash(),
            balance: pending.amount,
            modified: self.seconds_since_epoch,
            block_count: 1,
            epoch: Epoch::Epoch0,
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: AccountInfo::default(),
            set_account_info,
            delete_pending: Some(PendingKey::new(self.account, open.hashables.source)),
            insert_pending: None,
            set_sideband: self.sideband(
                1,
                pending.amount,
                BlockDetails::new(Epoch::Epoch0, false, true, false),
                Epoch::Epoch0,
            ),
            is_epoch_block: false,
        })
    }

    fn validate_legacy_change(
        &self,
        change: &ChangeBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        let previous = self.ensure_previous_block_exists()?;
        self.ensure_valid_predecessor(previous)?;
        self.ensure_frontier_present()?;
        self.ensure_valid_signature_for(&self.account)?;
        let info = self.account_info()?;

        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: change.hashables.representative,
            open_block: info.open_block,
            balance: info.balance,
            modified: self.seconds_since_epoch,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: info.clone(),
            set_account_info,
            delete_pending: None,
            insert_pending: None,
            set_sideband: self.sideband(
                info.block_count + 1,
                info.balance,
                BlockDetails::new(Epoch::Epoch0, false, false, false),
                Epoch::Epoch0,
            ),
            is_epoch_block: false,
        })
    }

    fn validate_state(
        &self,
        state: &StateBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        self.ensure_valid_signature_for(&state.hashables.account)?;
        if state.hashables.account.is_zero() {
            return Err(ProcessResult::OpenedBurnAccount);
        }

        let mut epoch = Epoch::Epoch0;
        let mut is_send = false;
        let mut amount = state.hashables.balance;
        let info = match &self.old_account_info {
            Some(info) => {
                epoch = info.epoch;
                // the account is already open, so this block has to
                // continue the existing chain
                if state.hashables.previous.is_zero() {
                    return Err(ProcessResult::Fork);
                }
                if self.previous_block.is_none() {
                    return Err(ProcessResult::GapPrevious);
                }
                is_send = state.hashables.balance < info.balance;
                amount = if is_send {
                    info.balance - state.hashables.balance
                } else {
                    state.hashables.balance - info.balance
                };
                if state.hashables.previous != info.head {
                    return Err(ProcessResult::Fork);
                }
                info.clone()
            }
            None => {
                // first block of the account has to receive something
                if !state.hashables.previous.is_zero() {
                    return Err(ProcessResult::GapPrevious);
                }
                if state.hashables.link.is_zero() {
                    return Err(ProcessResult::GapSource);
                }
                AccountInfo::default()
            }
        };

        let mut source_epoch = Epoch::Epoch0;
        if !is_send {
            if !state.hashables.link.is_zero() {
                self.ensure_source_block_exists()?;
                let pending = self.ensure_pending_receive()?;
                if amount != pending.amount {
                    return Err(ProcessResult::BalanceMismatch);
                }
                source_epoch = pending.epoch;
                epoch = std::cmp::max(epoch, pending.epoch);
            } else {
                // no link means a pure representative change, the balance
                // must stay as it is
                if !amount.is_zero() {
                    return Err(ProcessResult::BalanceMismatch);
                }
            }
        }

        let is_receive = !is_send && !state.hashables.link.is_zero();
        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: state.hashables.representative,
            open_block: if info.open_block.is_zero() {
                self.block.hash()
            } else {
                info.open_block
            },
            balance: state.hashables.balance,
            modified: self.seconds_since_epoch,
            block_count: info.block_count + 1,
            epoch,
        };

        let delete_pending = if is_receive {
            Some(PendingKey::new(self.account, state.hashables.link.into()))
        } else {
            None
        };
        let insert_pending = if is_send {
            Some((
                PendingKey::new(state.hashables.link.into(), self.block.hash()),
                PendingInfo::new(self.account, amount, epoch),
            ))
        } else {
            None
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: info.clone(),
            set_account_info,
            delete_pending,
            insert_pending,
            set_sideband: self.sideband(
                info.block_count + 1,
                state.hashables.balance,
                BlockDetails::new(epoch, is_send, is_receive, false),
                source_epoch,
            ),
            is_epoch_block: false,
        })
    }

    /// A state block carrying an epoch link is either an epoch block or a
    /// regular state send to the epoch link "account". The balance decides.
    fn validate_state_with_epoch_link(
        &self,
        state: &StateBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        let previous_balance = if !state.hashables.previous.is_zero() {
            match &self.previous_block {
                Some(previous) => previous.balance_calculated(),
                None => {
                    // distinguish a malformed block from a gap before
                    // giving up
                    if self.verification == SignatureVerification::Unknown
                        && self.account_signature_invalid(&state.hashables.account)
                        && self.epoch_signature_invalid(&state.hashables.link)
                    {
                        return Err(ProcessResult::BadSignature);
                    }
                    return Err(ProcessResult::GapPrevious);
                }
            }
        } else {
            Amount::zero()
        };

        if state.hashables.balance == previous_balance {
            self.validate_epoch(state)
        } else {
            self.validate_state(state)
        }
    }

    fn validate_epoch(
        &self,
        state: &StateBlock,
    ) -> Result<BlockInsertInstructions, ProcessResult> {
        self.ensure_valid_epoch_signature(&state.hashables.link)?;
        if state.hashables.account.is_zero() {
            return Err(ProcessResult::OpenedBurnAccount);
        }

        let info = match &self.old_account_info {
            Some(info) => {
                if state.hashables.previous.is_zero() {
                    return Err(ProcessResult::Fork);
                }
                if state.hashables.previous != info.head {
                    return Err(ProcessResult::Fork);
                }
                if state.hashables.representative != info.representative {
                    return Err(ProcessResult::RepresentativeMismatch);
                }
                info.clone()
            }
            None => {
                if !state.hashables.representative.is_zero() {
                    return Err(ProcessResult::RepresentativeMismatch);
                }
                AccountInfo::default()
            }
        };

        let epoch = self
            .epochs
            .epoch(&state.hashables.link)
            .ok_or(ProcessResult::BlockPosition)?;
        // an unopened account may start at any epoch, an open account has
        // to upgrade one step at a time
        let is_valid_upgrade = if self.old_account_info.is_none() {
            epoch.epoch_number() > 0
        } else {
            Epochs::is_sequential(info.epoch, epoch)
        };
        if !is_valid_upgrade {
            return Err(ProcessResult::BlockPosition);
        }

        if state.hashables.balance != info.balance {
            return Err(ProcessResult::BalanceMismatch);
        }

        let set_account_info = AccountInfo {
            head: self.block.hash(),
            representative: state.hashables.representative,
            open_block: if info.open_block.is_zero() {
                self.block.hash()
            } else {
                info.open_block
            },
            balance: info.balance,
            modified: self.seconds_since_epoch,
            block_count: info.block_count + 1,
            epoch,
        };

        Ok(BlockInsertInstructions {
            account: self.account,
            old_account_info: info.clone(),
            set_account_info,
            delete_pending: None,
            insert_pending: None,
            set_sideband: self.sideband(
                info.block_count + 1,
                info.balance,
                BlockDetails::new(epoch, false, false, true),
                Epoch::Epoch0,
            ),
            is_epoch_block: true,
        })
    }

    /*
     * Shared rules
     */

    fn ensure_block_does_not_exist_yet(&self) -> Result<(), ProcessResult> {
        if self.block_exists {
            Err(ProcessResult::Old)
        } else {
            Ok(())
        }
    }

    fn ensure_sufficient_work(&self) -> Result<(), ProcessResult> {
        if !self
            .work
            .validate_entry(&self.block.root(), self.block.work())
        {
            Err(ProcessResult::InsufficientWork)
        } else {
            Ok(())
        }
    }

    fn ensure_previous_block_exists(&self) -> Result<&BlockEnum, ProcessResult> {
        self.previous_block
            .as_ref()
            .ok_or(ProcessResult::GapPrevious)
    }

    fn ensure_valid_predecessor(&self, previous: &BlockEnum) -> Result<(), ProcessResult> {
        if !self.block.valid_predecessor(previous.block_type()) {
            Err(ProcessResult::BlockPosition)
        } else {
            Ok(())
        }
    }

    /// Send and change blocks can only follow a legacy head; a stored
    /// predecessor that is no legacy head means this slot is taken
    fn ensure_frontier_present(&self) -> Result<(), ProcessResult> {
        if self.frontier_missing {
            Err(ProcessResult::Fork)
        } else {
            Ok(())
        }
    }

    fn ensure_valid_signature_for(&self, signer: &Account) -> Result<(), ProcessResult> {
        if self.verification == SignatureVerification::Valid {
            return Ok(());
        }
        if self.account_signature_invalid(signer) {
            return Err(ProcessResult::BadSignature);
        }
        Ok(())
    }

    fn ensure_valid_epoch_signature(&self, link: &rsbtcnew_core::Link) -> Result<(), ProcessResult> {
        if self.verification == SignatureVerification::ValidEpoch {
            return Ok(());
        }
        if self.epoch_signature_invalid(link) {
            return Err(ProcessResult::BadSignature);
        }
        Ok(())
    }

    fn account_signature_invalid(&self, signer: &Account) -> bool {
        validate_message(
            &PublicKey::from(signer),
            self.block.hash().as_bytes(),
            self.block.block_signature(),
        )
        .is_err()
    }

    fn epoch_signature_invalid(&self, link: &rsbtcnew_core::Link) -> bool {
        let Some(signer) = self.epochs.epoch_signer(link) else {
            return true;
        };
        validate_message(
            &PublicKey::from(signer),
            self.block.hash().as_bytes(),
            self.block.block_signature(),
        )
        .is_err()
    }

    fn ensure_source_block_exists(&self) -> Result<(), ProcessResult> {
        if !self.source_block_exists {
            Err(ProcessResult::GapSource)
        } else {
            Ok(())
        }
    }

    fn ensure_pending_receive(&self) -> Result<PendingInfo, ProcessResult> {
        self.pending_receive_info
            .clone()
            .ok_or(ProcessResult::Unreceivable)
    }

    /// Sends from a state block carry the sender's epoch; legacy receive
    /// and open blocks can only receive epoch 0 sends
    fn ensure_legacy_receivable(&self, pending: &PendingInfo) -> Result<(), ProcessResult> {
        if pending.epoch != Epoch::Epoch0 {
            Err(ProcessResult::Unreceivable)
        } else {
            Ok(())
        }
    }

    fn account_info(&self) -> Result<AccountInfo, ProcessResult> {
        // a present frontier guarantees the account row exists
        self.old_account_info
            .clone()
            .ok_or(ProcessResult::GapPrevious)
    }

    fn sideband(
        &self,
        height: u64,
        balance: Amount,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> BlockSideband {
        BlockSideband::new(
            self.account,
            rsbtcnew_core::BlockHash::zero(),
            balance,
            height,
            self.seconds_since_epoch,
            details,
            source_epoch,
        )
    }
}
