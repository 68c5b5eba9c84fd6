use rsbtcnew_core::{Account, Amount, Block};

use super::LedgerContext;
use crate::{ledger_constants::LEDGER_CONSTANTS_STUB, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};

#[test]
fn rollback_change_restores_the_representative() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let new_rep = Account::from(1111);
    let mut change = genesis
        .legacy_change(&txn)
        .representative(new_rep)
        .build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.representative, *DEV_GENESIS_ACCOUNT);
    assert_eq!(info.head, *DEV_GENESIS_HASH);
    assert_eq!(info.block_count, 1);

    assert_eq!(ctx.ledger.weight(&new_rep), Amount::zero());
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
}

#[test]
fn rollback_change_restores_the_frontier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut change = genesis.legacy_change(&txn).build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    assert_eq!(ctx.ledger.get_frontier(&txn, &change.hash()), None);
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
}
