use super::LedgerContext;
use crate::{
    ledger_constants::LEDGER_CONSTANTS_STUB, ProcessResult, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use rsbtcnew_core::{Account, Block, KeyPair};

// original test: ledger.process_change
#[test]
fn moves_the_voting_weight() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let new_rep = Account::from(1111);
    let mut change = genesis
        .legacy_change(&txn)
        .representative(new_rep)
        .build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_ACCOUNT), rsbtcnew_core::Amount::zero());
    assert_eq!(
        ctx.ledger.weight(&new_rep),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.representative, new_rep);
    assert_eq!(info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
    assert_eq!(info.block_count, 2);
}

#[test]
fn moves_the_frontier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut change = genesis.legacy_change(&txn).build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    assert_eq!(ctx.ledger.get_frontier(&txn, &DEV_GENESIS_HASH), None);
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &change.hash()),
        Some(*DEV_GENESIS_ACCOUNT)
    );
}

// original test: ledger.fail_change_fork
#[test]
fn competing_change_fails_with_fork() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut change = genesis
        .legacy_change(&txn)
        .representative(Account::from(1))
        .build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    let mut fork = genesis
        .legacy_change(&txn)
        .previous(*DEV_GENESIS_HASH)
        .representative(Account::from(2))
        .build();
    let result = ctx.ledger.process(&mut txn, &mut fork);
    assert_eq!(result, Err(ProcessResult::Fork));
}

// original test: ledger.fail_change_bad_signature
#[test]
fn change_signed_by_the_wrong_key_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let wrong_key = KeyPair::new();
    let mut change = genesis.legacy_change(&txn).sign(&wrong_key).build();
    let result = ctx.ledger.process(&mut txn, &mut change);
    assert_eq!(result, Err(ProcessResult::BadSignature));
}
