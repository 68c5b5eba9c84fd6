use once_cell::sync::Lazy;
use rsbtcnew_core::{
    work::WorkThresholds, Account, Amount, Block, BlockBuilder, BlockEnum, BlockHash, Epoch,
    Epochs, Link, DEV_GENESIS_KEY,
};

/// Network wide constants the ledger operates under
#[derive(Clone)]
pub struct LedgerConstants {
    pub work: WorkThresholds,
    pub genesis: BlockEnum,
    pub genesis_account: Account,
    pub genesis_amount: Amount,
    pub burn_account: Account,
    pub epochs: Epochs,
}

impl LedgerConstants {
    pub fn dev() -> Self {
        let genesis_account: Account = DEV_GENESIS_KEY.public_key().into();
        let genesis = BlockBuilder::legacy_open()
            .source(BlockHash::from_bytes(*genesis_account.as_bytes()))
            .representative(genesis_account)
            .account(genesis_account)
            .sign(&DEV_GENESIS_KEY)
            .build();

        let mut epochs = Epochs::new();
        epochs.add(
            Epoch::Epoch1,
            DEV_GENESIS_KEY.public_key(),
            epoch_link(b"epoch v1 block"),
        );
        epochs.add(
            Epoch::Epoch2,
            DEV_GENESIS_KEY.public_key(),
            epoch_link(b"epoch v2 block"),
        );

        Self {
            work: WorkThresholds::publish_dev().clone(),
            genesis,
            genesis_account,
            genesis_amount: Amount::MAX,
            burn_account: Account::zero(),
            epochs,
        }
    }
}

fn epoch_link(tag: &[u8]) -> Link {
    let mut bytes = [0u8; 32];
    bytes[..tag.len()].copy_from_slice(tag);
    Link::from_bytes(bytes)
}

pub static LEDGER_CONSTANTS_STUB: Lazy<LedgerConstants> = Lazy::new(LedgerConstants::dev);

pub static DEV_GENESIS: Lazy<BlockEnum> = Lazy::new(|| LEDGER_CONSTANTS_STUB.genesis.clone());

pub static DEV_GENESIS_ACCOUNT: Lazy<Account> =
    Lazy::new(|| LEDGER_CONSTANTS_STUB.genesis_account);

pub static DEV_GENESIS_HASH: Lazy<BlockHash> = Lazy::new(|| DEV_GENESIS.hash());
