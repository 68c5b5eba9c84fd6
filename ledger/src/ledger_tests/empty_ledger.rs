use super::LedgerContext;
use crate::{
    ledger_constants::LEDGER_CONSTANTS_STUB, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use rsbtcnew_core::{Account, Amount, Block, BlockHash};
use std::sync::atomic::Ordering;

// original test: block_store.genesis
#[test]
fn genesis_is_installed_on_first_open() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.head, *DEV_GENESIS_HASH);
    assert_eq!(info.open_block, *DEV_GENESIS_HASH);
    assert_eq!(info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
    assert_eq!(info.block_count, 1);

    let genesis = ctx.ledger.get_block(&txn, &DEV_GENESIS_HASH).unwrap();
    assert_eq!(genesis.sideband().unwrap().height, 1);

    // the genesis block starts out confirmed
    let conf = ctx
        .ledger
        .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(conf.height, 1);
    assert_eq!(conf.frontier, *DEV_GENESIS_HASH);
    assert!(ctx.ledger.block_confirmed(&txn, &DEV_GENESIS_HASH));
}

#[test]
fn genesis_holds_all_voting_weight() {
    let ctx = LedgerContext::empty();
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
    assert_eq!(ctx.ledger.weight(&Account::from(42)), Amount::zero());
}

#[test]
fn caches_are_seeded() {
    let ctx = LedgerContext::empty();
    assert_eq!(ctx.ledger.cache.block_count.load(Ordering::Relaxed), 1);
    assert_eq!(ctx.ledger.cache.account_count.load(Ordering::Relaxed), 1);
    assert_eq!(ctx.ledger.cache.cemented_count.load(Ordering::Relaxed), 1);
}

#[test]
fn genesis_head_is_a_frontier() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
}

#[test]
fn unknown_block_reads() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    let unknown = BlockHash::from(42);
    assert_eq!(ctx.ledger.get_block(&txn, &unknown), None);
    assert!(!ctx.ledger.block_exists(&txn, &unknown));
    assert_eq!(ctx.ledger.balance(&txn, &unknown), Amount::zero());
    assert!(!ctx.ledger.block_confirmed(&txn, &unknown));
}
