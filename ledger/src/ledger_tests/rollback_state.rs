use rsbtcnew_core::{Amount, Block, Epoch, PendingKey};

use super::{
    assert_genesis_amount_conserved, setup_state_send_block, LedgerContext,
};
use crate::{ledger_constants::LEDGER_CONSTANTS_STUB, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};

#[test]
fn rollback_state_send() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    ctx.ledger
        .rollback(&mut txn, &send.send_block.hash())
        .unwrap();

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.head, *DEV_GENESIS_HASH);
    assert_eq!(info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
    assert_eq!(
        ctx.ledger.pending_info(
            &txn,
            &PendingKey::new(send.destination.account(), send.send_block.hash())
        ),
        None
    );
    // the genesis block is a legacy head again
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &DEV_GENESIS_HASH),
        Some(*DEV_GENESIS_ACCOUNT)
    );
    assert_genesis_amount_conserved(&ctx, &txn);
}

#[test]
fn rollback_state_send_cascades_into_the_receiving_chain() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    let mut open = send
        .destination
        .open(&txn, send.send_block.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    let rolled_back = ctx
        .ledger
        .rollback(&mut txn, &send.send_block.hash())
        .unwrap();

    assert_eq!(rolled_back.len(), 2);
    assert!(!ctx.ledger.block_exists(&txn, &open.hash()));
    assert!(!ctx.ledger.block_exists(&txn, &send.send_block.hash()));
    assert!(ctx
        .ledger
        .account_info(&txn, &send.destination.account())
        .is_none());
    assert_genesis_amount_conserved(&ctx, &txn);
}

#[test]
fn rollback_state_receive() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    let mut open = send
        .destination
        .open(&txn, send.send_block.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    ctx.ledger.rollback(&mut txn, &open.hash()).unwrap();

    let pending = ctx
        .ledger
        .pending_info(
            &txn,
            &PendingKey::new(send.destination.account(), send.send_block.hash()),
        )
        .unwrap();
    assert_eq!(pending.source, *DEV_GENESIS_ACCOUNT);
    assert_eq!(pending.amount, send.amount_sent);
    assert_eq!(pending.epoch, Epoch::Epoch0);
    assert!(ctx
        .ledger
        .account_info(&txn, &send.destination.account())
        .is_none());
    assert_genesis_amount_conserved(&ctx, &txn);
}

#[test]
fn rollback_epoch_block_downgrades_the_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut epoch = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &mut epoch).unwrap();

    ctx.ledger.rollback(&mut txn, &epoch.hash()).unwrap();

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.epoch, Epoch::Epoch0);
    assert_eq!(info.head, *DEV_GENESIS_HASH);
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );

    // a fresh epoch upgrade works again afterwards
    let mut epoch_again = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &mut epoch_again).unwrap();
    assert_eq!(
        ctx.ledger
            .account_info(&txn, &DEV_GENESIS_ACCOUNT)
            .unwrap()
            .epoch,
        Epoch::Epoch1
    );
}

// scenario: send 50 twice, receive once, roll the receive back
#[test]
fn receive_then_rollback_restores_the_receivable_amount() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let send = setup_state_send_block(&ctx, &mut txn);
    let mut open = send
        .destination
        .open(&txn, send.send_block.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    let mut send2 = genesis
        .send(&txn)
        .link(send.destination.account())
        .amount_sent(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut receive = send.destination.receive(&txn, send2.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    let pending = ctx
        .ledger
        .pending_info(
            &txn,
            &PendingKey::new(send.destination.account(), send2.hash()),
        )
        .unwrap();
    assert_eq!(pending.amount, Amount::raw(50));
    assert_eq!(
        ctx.ledger
            .account_balance(&txn, &send.destination.account(), false),
        Amount::raw(50)
    );
    assert_eq!(
        ctx.ledger.weight(&send.destination.account()),
        Amount::raw(50)
    );
    assert_genesis_amount_conserved(&ctx, &txn);
}
