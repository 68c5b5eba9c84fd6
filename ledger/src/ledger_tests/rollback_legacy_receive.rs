use rsbtcnew_core::{Amount, Block, Epoch, PendingKey};

use super::{assert_genesis_amount_conserved, setup_legacy_open_block, LedgerContext};
use crate::DEV_GENESIS_ACCOUNT;

#[test]
fn rollback_receive_restores_the_pending_entry() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let mut send2 = genesis
        .legacy_send(&txn)
        .destination(open.destination.account())
        .amount(Amount::raw(25))
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut receive = open
        .destination
        .legacy_receive(&txn, send2.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    // the pending entry reappears exactly as the send created it
    let pending = ctx
        .ledger
        .pending_info(
            &txn,
            &PendingKey::new(open.destination.account(), send2.hash()),
        )
        .unwrap();
    assert_eq!(pending.source, *DEV_GENESIS_ACCOUNT);
    assert_eq!(pending.amount, Amount::raw(25));
    assert_eq!(pending.epoch, Epoch::Epoch0);

    let info = open.destination.info(&txn).unwrap();
    assert_eq!(info.head, open.open_block.hash());
    assert_eq!(info.balance, open.amount_sent);
    assert_eq!(info.block_count, 1);

    assert_eq!(
        ctx.ledger.weight(&open.destination.account()),
        open.amount_sent
    );
    assert!(!ctx.ledger.block_exists(&txn, &receive.hash()));
    assert_genesis_amount_conserved(&ctx, &txn);
}

#[test]
fn rollback_receive_restores_the_frontier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let mut send2 = genesis
        .legacy_send(&txn)
        .destination(open.destination.account())
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut receive = open
        .destination
        .legacy_receive(&txn, send2.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    assert_eq!(ctx.ledger.get_frontier(&txn, &receive.hash()), None);
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &open.open_block.hash()),
        Some(open.destination.account())
    );
}

#[test]
fn rollback_open_erases_the_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    ctx.ledger
        .rollback(&mut txn, &open.open_block.hash())
        .unwrap();

    assert!(ctx
        .ledger
        .account_info(&txn, &open.destination.account())
        .is_none());
    assert_eq!(
        ctx.ledger
            .get_confirmation_height(&txn, &open.destination.account()),
        None
    );
    assert_eq!(
        ctx.ledger.weight(&open.destination.account()),
        Amount::zero()
    );

    // the send becomes receivable again
    let pending = ctx
        .ledger
        .pending_info(
            &txn,
            &PendingKey::new(open.destination.account(), open.send_block.hash()),
        )
        .unwrap();
    assert_eq!(pending.amount, open.amount_sent);
    assert_genesis_amount_conserved(&ctx, &txn);
}
