use std::sync::atomic::Ordering;

use rsbtcnew_core::{Amount, Block, PendingKey};

use super::{setup_legacy_send_block, LedgerContext};
use crate::{ledger_constants::LEDGER_CONSTANTS_STUB, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};

#[test]
fn confirm_advances_the_height() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_legacy_send_block(&ctx, &mut txn);

    assert!(!ctx.ledger.block_confirmed(&txn, &send.send_block.hash()));

    let cemented = ctx
        .ledger
        .confirm(&mut txn, send.send_block.hash())
        .unwrap();
    assert_eq!(cemented.len(), 1);
    assert_eq!(cemented[0].hash(), send.send_block.hash());

    let conf = ctx
        .ledger
        .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(conf.height, 2);
    assert_eq!(conf.frontier, send.send_block.hash());
    assert!(ctx.ledger.block_confirmed(&txn, &send.send_block.hash()));
    assert_eq!(ctx.ledger.cache.cemented_count.load(Ordering::Relaxed), 2);
}

#[test]
fn confirm_cements_every_block_up_to_the_target() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send1 = genesis.legacy_send(&txn).build();
    ctx.ledger.process(&mut txn, &mut send1).unwrap();
    let mut send2 = genesis.legacy_send(&txn).build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let cemented = ctx.ledger.confirm(&mut txn, send2.hash()).unwrap();
    assert_eq!(cemented.len(), 2);
    assert_eq!(cemented[0].hash(), send1.hash());
    assert_eq!(cemented[1].hash(), send2.hash());
}

// confirmation heights never go backwards
#[test]
fn confirming_below_the_recorded_height_is_a_no_op() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_legacy_send_block(&ctx, &mut txn);
    ctx.ledger
        .confirm(&mut txn, send.send_block.hash())
        .unwrap();

    let cemented = ctx.ledger.confirm(&mut txn, *DEV_GENESIS_HASH).unwrap();
    assert!(cemented.is_empty());
    assert_eq!(
        ctx.ledger
            .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .height,
        2
    );
}

// original test: ledger.rollback_confirmed
#[test]
fn rollback_refuses_to_cross_the_confirmation_barrier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_legacy_send_block(&ctx, &mut txn);
    ctx.ledger
        .confirm(&mut txn, send.send_block.hash())
        .unwrap();

    let info_before = ctx.ledger.account_info(&txn, &DEV_GENESIS_ACCOUNT).unwrap();
    let weight_before = ctx.ledger.weight(&DEV_GENESIS_ACCOUNT);

    let result = ctx.ledger.rollback(&mut txn, &send.send_block.hash());
    assert!(result.is_err());

    // nothing changed
    let info_after = ctx.ledger.account_info(&txn, &DEV_GENESIS_ACCOUNT).unwrap();
    assert_eq!(info_after, info_before);
    assert!(ctx.ledger.block_exists(&txn, &send.send_block.hash()));
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_ACCOUNT), weight_before);
    assert_eq!(
        ctx.ledger
            .pending_info(
                &txn,
                &PendingKey::new(send.destination.account(), send.send_block.hash())
            )
            .unwrap()
            .amount,
        send.amount_sent
    );
    assert_eq!(
        ctx.ledger
            .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .height,
        2
    );
}

#[test]
fn rollback_above_the_barrier_is_allowed() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send1 = genesis.legacy_send(&txn).build();
    ctx.ledger.process(&mut txn, &mut send1).unwrap();
    ctx.ledger.confirm(&mut txn, send1.hash()).unwrap();

    let mut send2 = genesis
        .legacy_send(&txn)
        .amount(Amount::raw(10))
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    ctx.ledger.rollback(&mut txn, &send2.hash()).unwrap();

    assert_eq!(
        ctx.ledger
            .account_info(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .head,
        send1.hash()
    );
}

#[test]
fn inc_confirmation_height_helper_matches_the_interface() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_legacy_send_block(&ctx, &mut txn);
    ctx.inc_confirmation_height(&mut txn, &DEV_GENESIS_ACCOUNT);

    assert_eq!(
        ctx.ledger
            .get_confirmation_height(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .height,
        2
    );
    assert!(ctx.ledger.rollback(&mut txn, &send.send_block.hash()).is_err());
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount - send.amount_sent
    );
}
