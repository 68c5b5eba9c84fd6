use super::{
    assert_genesis_amount_conserved, setup_legacy_open_block, setup_state_send_block,
    LedgerContext,
};
use crate::{
    ledger_constants::LEDGER_CONSTANTS_STUB, ProcessResult, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
use rsbtcnew_core::{
    Account, Amount, Block, BlockBuilder, BlockHash, Epoch, Link, PendingKey,
    SignatureVerification, DEV_GENESIS_KEY,
};

// original test: ledger.state_send_receive
#[test]
fn state_send_updates_the_store() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);
    let hash = send.send_block.hash();

    let sideband = send.send_block.sideband().unwrap();
    assert_eq!(sideband.height, 2);
    assert!(sideband.details.is_send);
    assert!(!sideband.details.is_receive);

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.head, hash);
    assert_eq!(
        info.balance,
        LEDGER_CONSTANTS_STUB.genesis_amount - send.amount_sent
    );

    let pending = ctx
        .ledger
        .pending_info(&txn, &PendingKey::new(send.destination.account(), hash))
        .unwrap();
    assert_eq!(pending.source, *DEV_GENESIS_ACCOUNT);
    assert_eq!(pending.amount, send.amount_sent);
    assert_eq!(pending.epoch, Epoch::Epoch0);

    assert_genesis_amount_conserved(&ctx, &txn);
}

// state block heads must not appear in the frontier index
#[test]
fn state_block_head_is_not_a_frontier() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    assert_eq!(ctx.ledger.get_frontier(&txn, &DEV_GENESIS_HASH), None);
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &send.send_block.hash()),
        None
    );
}

// original test: ledger.state_open
#[test]
fn state_open_creates_the_account() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    let mut open = send
        .destination
        .open(&txn, send.send_block.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    let info = send.destination.info(&txn).unwrap();
    assert_eq!(info.head, open.hash());
    assert_eq!(info.open_block, open.hash());
    assert_eq!(info.balance, send.amount_sent);
    assert_eq!(info.block_count, 1);
    assert_eq!(info.epoch, Epoch::Epoch0);

    assert_eq!(
        ctx.ledger.pending_info(
            &txn,
            &PendingKey::new(send.destination.account(), send.send_block.hash())
        ),
        None
    );
    assert_eq!(
        ctx.ledger.weight(&send.destination.account()),
        send.amount_sent
    );
    assert_genesis_amount_conserved(&ctx, &txn);
}

// original test: ledger.state_receive
#[test]
fn state_receive_on_a_legacy_chain() {
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

    let mut receive = open.destination.receive(&txn, send2.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    let info = open.destination.info(&txn).unwrap();
    assert_eq!(info.head, receive.hash());
    assert_eq!(info.balance, open.amount_sent + Amount::raw(25));
    assert!(receive.sideband().unwrap().details.is_receive);

    // the legacy head made way for a state head, so the frontier entry is
    // gone for good
    assert_eq!(
        ctx.ledger.get_frontier(&txn, &open.open_block.hash()),
        None
    );
    assert_eq!(ctx.ledger.get_frontier(&txn, &receive.hash()), None);
}

// original test: ledger.state_rep_change
#[test]
fn state_change_keeps_the_balance() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let new_rep = Account::from(1111);
    let mut change = genesis.change(&txn).representative(new_rep).build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    let info = ctx
        .ledger
        .account_info(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    assert_eq!(info.representative, new_rep);
    assert_eq!(info.balance, LEDGER_CONSTANTS_STUB.genesis_amount);
    assert_eq!(
        ctx.ledger.weight(&new_rep),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_ACCOUNT), Amount::zero());

    let sideband = change.sideband().unwrap();
    assert!(!sideband.details.is_send);
    assert!(!sideband.details.is_receive);
}

// a balance change without a link is a malformed representative change
#[test]
fn state_change_with_balance_delta_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut change = genesis
        .change(&txn)
        .balance(LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(1))
        .build();
    let result = ctx.ledger.process(&mut txn, &mut change);
    assert_eq!(result, Err(ProcessResult::BalanceMismatch));
}

// original test: ledger.state_state_open_fork
#[test]
fn state_open_fork_fails() {
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
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    // a competing open for the already-opened account
    let mut fork = send.destination.open(&txn, send2.hash()).build();
    let result = ctx.ledger.process(&mut txn, &mut fork);
    assert_eq!(result, Err(ProcessResult::Fork));
}

// original test: ledger.state_receive_bad_amount
#[test]
fn state_receive_with_wrong_amount_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_state_send_block(&ctx, &mut txn);

    let mut open = BlockBuilder::state()
        .account(send.destination.account())
        .previous(BlockHash::zero())
        .representative(send.destination.account())
        .balance(send.amount_sent + Amount::raw(1))
        .link(send.send_block.hash())
        .key(&send.destination.key)
        .build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::BalanceMismatch));
}

// original test: ledger.state_gap_previous
#[test]
fn state_block_with_unknown_previous_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send = genesis
        .send(&txn)
        .previous(BlockHash::from(12345))
        .build();
    let result = ctx.ledger.process(&mut txn, &mut send);
    assert_eq!(result, Err(ProcessResult::GapPrevious));
}

// original test: ledger.state_open_no_link
#[test]
fn state_open_without_link_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let destination = ctx.block_factory();
    let mut open = BlockBuilder::state()
        .account(destination.account())
        .previous(BlockHash::zero())
        .representative(destination.account())
        .balance(Amount::raw(1))
        .link(Link::zero())
        .key(&destination.key)
        .build();
    let result = ctx.ledger.process(&mut txn, &mut open);
    assert_eq!(result, Err(ProcessResult::GapSource));
}

// a legacy block can never continue a chain whose head is a state block
#[test]
fn legacy_send_after_state_block_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let send = setup_state_send_block(&ctx, &mut txn);

    let mut legacy_send = genesis
        .legacy_send(&txn)
        .previous(send.send_block.hash())
        .build();
    let result = ctx.ledger.process(&mut txn, &mut legacy_send);
    assert_eq!(result, Err(ProcessResult::BlockPosition));
}

// the receivable entry of a send records the sender's epoch; legacy
// receives can only consume epoch 0 entries
#[test]
fn legacy_receive_of_an_epoch1_send_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let open = setup_legacy_open_block(&ctx, &mut txn);

    let mut epoch = genesis.epoch_v1(&txn).build();
    ctx.ledger.process(&mut txn, &mut epoch).unwrap();

    let mut state_send = genesis
        .send(&txn)
        .link(open.destination.account())
        .build();
    ctx.ledger.process(&mut txn, &mut state_send).unwrap();

    let mut receive = open
        .destination
        .legacy_receive(&txn, state_send.hash())
        .build();
    let result = ctx.ledger.process(&mut txn, &mut receive);
    assert_eq!(result, Err(ProcessResult::Unreceivable));

    // a state receive consumes the same entry just fine
    let mut state_receive = open
        .destination
        .receive(&txn, state_send.hash())
        .build();
    ctx.ledger.process(&mut txn, &mut state_receive).unwrap();
    assert_eq!(
        open.destination.info(&txn).unwrap().epoch,
        rsbtcnew_core::Epoch::Epoch1
    );
}

// the burn check only fires when signatures were verified out of band,
// otherwise the zero key fails signature validation first
#[test]
fn state_block_for_burn_account_fails() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let mut block = BlockBuilder::state()
        .account(Account::zero())
        .previous(BlockHash::zero())
        .representative(Account::zero())
        .balance(Amount::raw(1))
        .link(Link::from(123))
        .key(&DEV_GENESIS_KEY)
        .build();
    let result =
        ctx.ledger
            .process_verified(&mut txn, &mut block, SignatureVerification::Valid);
    assert_eq!(result, Err(ProcessResult::OpenedBurnAccount));
}

// pre-verified blocks skip the in-ledger signature check
#[test]
fn process_verified_accepts_foreign_signature() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let other_key = rsbtcnew_core::KeyPair::new();
    let mut send = genesis.send(&txn).key(&other_key).build();
    assert_eq!(
        ctx.ledger.process(&mut txn, &mut send),
        Err(ProcessResult::BadSignature)
    );
    ctx.ledger
        .process_verified(&mut txn, &mut send, SignatureVerification::Valid)
        .unwrap();
}
