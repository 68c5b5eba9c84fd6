use super::{
    assert_genesis_amount_conserved, setup_legacy_open_block, setup_legacy_send_block,
    LedgerContext,
};
use crate::ProcessResult;
use rsbtcnew_core::{Account, Block, BlockBuilder, BlockHash, PendingKey, DEV_GENESIS_KEY};

// original test: ledger.process_open
#[test]
fn opens_the_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let sideband = open.open_block.sideband().unwrap();
    assert_eq!(sideband.height, 1);
    assert_eq!(sideband.balance, open.amount_sent);

    let info = open.destination.info(&txn).unwrap();
    assert_eq!(info.head, open.open_block.hash());
    assert_eq!(info.open_block, open.open_block.hash());
    assert_eq!(info.block_count, 1);
    assert_eq!(info.balance, open.amount_sent);

    // pending entry is consumed
    assert_eq!(
        ctx.ledger.pending_info(
            &txn,
            &PendingKey::new(open.destination.account(), open.send_block.hash())
        ),
        None
    );

    // a brand new account starts with confirmation height zero
    let conf = ctx
        .ledger
        .get_confirmation_height(&txn, &open.destination.account())
        .unwrap();
    assert_eq!(conf.height, 0);

    assert_eq!(
        ctx.ledger.weight(&open.destination.account()),
        open.amount_sent
    );
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &open.open_block.hash()),
        Some(open.destination.account())
    );
    assert_genesis_amount_conserved(&ctx, &txn);
}

// original test: ledger.fail_open_fork_previous
#[test]
fn opening_an_account_twice_fails_with_fork() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let mut send2 = genesis
        .legacy_send(&txn)
        .destination(open.destination.account())
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut second_open = open.destination.legacy_open(send2.hash()).build();
    let result = ctx.ledger.process(&mut txn, &mut second_open);
    assert_eq!(result, Err(ProcessResult::Fork));
}

// original test: ledger.fail_gap_source
#[test]
fn open_with_unknown_source_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let destination = ctx.block_factory();
    let mut open = destination.legacy_open(BlockHash::from(12345)).build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::GapSource));
}

#[test]
fn open_without_a_matching_send_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    // the send goes to somebody else
    let send = setup_legacy_send_block(&ctx, &mut txn);

    let thief = ctx.block_factory();
    let mut open = thief.legacy_open(send.send_block.hash()).build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::Unreceivable));
}

// original test: ledger.open_burn_account
#[test]
fn opening_the_burn_account_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send = genesis
        .legacy_send(&txn)
        .destination(Account::zero())
        .build();
    ctx.ledger.process(&mut txn, &mut send).unwrap();

    let mut open = BlockBuilder::legacy_open()
        .source(send.hash())
        .account(Account::zero())
        .representative(Account::zero())
        .sign(&DEV_GENESIS_KEY)
        .build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::BadSignature));
}

// sends carrying a non-zero epoch cannot be received by a legacy open
#[test]
fn legacy_open_of_an_epoch1_send_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let destination = ctx.block_factory();

    let mut epoch = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &mut epoch).unwrap();

    let mut send = genesis.send(&txn).link(destination.account()).build();
    ctx.ledger.process(&mut txn, &mut send).unwrap();

    let mut open = destination.legacy_open(send.hash()).build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::Unreceivable));
}
