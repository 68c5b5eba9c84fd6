use std::sync::atomic::Ordering;

use crate::{
    ledger_constants::LEDGER_CONSTANTS_STUB, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH,
};
pub(crate) use helpers::*;
use rsbtcnew_core::{Account, Amount, Block, BlockHash, KeyPair, QualifiedRoot, Root};

mod confirmation_height;
mod empty_ledger;
mod process_legacy_change;
mod process_legacy_open;
mod process_state_block;
mod rollback_legacy_change;
mod rollback_legacy_receive;
mod rollback_state;
mod unchecked;

#[test]
fn ledger_successor() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let send = setup_legacy_send_block(&ctx, &mut txn);

    assert_eq!(
        ctx.ledger.successor(
            &txn,
            &QualifiedRoot::new(Root::zero(), *DEV_GENESIS_HASH)
        ),
        Some(send.send_block)
    );
}

#[test]
fn ledger_successor_genesis() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    setup_legacy_send_block(&ctx, &mut txn);
    let genesis = LEDGER_CONSTANTS_STUB.genesis.clone();

    assert_eq!(
        ctx.ledger.successor(
            &txn,
            &QualifiedRoot::new((*DEV_GENESIS_ACCOUNT).into(), BlockHash::zero())
        ),
        Some(genesis)
    );
}

#[test]
fn latest_root_empty() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert_eq!(
        ctx.ledger.latest_root(&txn, &Account::from(1)),
        Root::from(1)
    );
}

#[test]
fn latest_root() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let send = setup_legacy_send_block(&ctx, &mut txn);

    assert_eq!(
        ctx.ledger.latest_root(&txn, &DEV_GENESIS_ACCOUNT),
        send.send_block.hash().into()
    );
}

#[test]
fn send_open_receive_vote_weight() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();

    let mut send1 = genesis
        .legacy_send(&txn)
        .destination(receiver.account())
        .amount(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &mut send1).unwrap();

    let mut send2 = genesis
        .legacy_send(&txn)
        .destination(receiver.account())
        .amount(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut open = receiver.legacy_open(send1.hash()).build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    let mut receive = receiver.legacy_receive(&txn, send2.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    assert_eq!(ctx.ledger.weight(&receiver.account()), Amount::raw(100));
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(100)
    );
}

#[test]
fn send_open_receive_rollback() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let receiver = AccountBlockFactory::new(&ctx.ledger);

    let mut send1 = genesis
        .legacy_send(&txn)
        .destination(receiver.account())
        .amount(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &mut send1).unwrap();

    let mut send2 = genesis
        .legacy_send(&txn)
        .destination(receiver.account())
        .amount(Amount::raw(50))
        .build();
    ctx.ledger.process(&mut txn, &mut send2).unwrap();

    let mut open = receiver.legacy_open(send1.hash()).build();
    ctx.ledger.process(&mut txn, &mut open).unwrap();

    let mut receive = receiver.legacy_receive(&txn, send2.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    let rep_account = Account::from(1);
    let mut change = genesis
        .legacy_change(&txn)
        .representative(rep_account)
        .build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();

    ctx.ledger.rollback(&mut txn, &receive.hash()).unwrap();

    assert_eq!(ctx.ledger.weight(&receiver.account()), Amount::raw(50));
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_ACCOUNT), Amount::zero());
    assert_eq!(
        ctx.ledger.weight(&rep_account),
        LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(100)
    );

    ctx.ledger.rollback(&mut txn, &open.hash()).unwrap();

    assert_eq!(ctx.ledger.weight(&receiver.account()), Amount::zero());
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_ACCOUNT), Amount::zero());
    assert_eq!(
        ctx.ledger.weight(&rep_account),
        LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(100)
    );

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    assert_eq!(ctx.ledger.weight(&receiver.account()), Amount::zero());
    assert_eq!(ctx.ledger.weight(&rep_account), Amount::zero());
    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(100)
    );

    ctx.ledger.rollback(&mut txn, &send2.hash()).unwrap();

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount - Amount::raw(50)
    );

    ctx.ledger.rollback(&mut txn, &send1.hash()).unwrap();

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_ACCOUNT),
        LEDGER_CONSTANTS_STUB.genesis_amount
    );
    assert_genesis_amount_conserved(&ctx, &txn);
}

#[test]
fn bootstrap_rep_weight() {
    let ctx = LedgerContext::empty();
    ctx.ledger.set_bootstrap_weight_max_blocks(3);
    let genesis = ctx.genesis_block_factory();
    let representative_key = KeyPair::new();
    let representative_account: Account = representative_key.public_key().into();
    {
        let mut txn = ctx.ledger.rw_txn();
        let mut send = genesis
            .legacy_send(&txn)
            .destination(representative_account)
            .amount(Amount::raw(50))
            .build();
        ctx.ledger.process(&mut txn, &mut send).unwrap();
    }
    {
        let mut weights = ctx.ledger.bootstrap_weights.lock().unwrap();
        weights.insert(representative_account, Amount::raw(1000));
    }
    assert_eq!(ctx.ledger.cache.block_count.load(Ordering::Relaxed), 2);
    assert_eq!(
        ctx.ledger.weight(&representative_account),
        Amount::raw(1000)
    );
    {
        let mut txn = ctx.ledger.rw_txn();
        let mut send = genesis
            .legacy_send(&txn)
            .destination(representative_account)
            .amount(Amount::raw(50))
            .build();
        ctx.ledger.process(&mut txn, &mut send).unwrap();
    }
    assert_eq!(ctx.ledger.cache.block_count.load(Ordering::Relaxed), 3);
    assert_eq!(ctx.ledger.weight(&representative_account), Amount::zero());
}

#[test]
fn bootstrap_weights_blob_ignored_when_ledger_is_further() {
    let ctx = LedgerContext::empty();
    let mut bytes = Vec::new();
    // generated at block count 1; the dev ledger already has 1 block
    bytes.extend_from_slice(&1u128.to_be_bytes());
    ctx.ledger.load_bootstrap_weights(&bytes).unwrap();
    assert_eq!(ctx.ledger.bootstrap_weight_max_blocks(), 0);

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1000u128.to_be_bytes());
    bytes.extend_from_slice(Account::from(7).as_bytes());
    bytes.extend_from_slice(&Amount::raw(42).to_be_bytes());
    ctx.ledger.load_bootstrap_weights(&bytes).unwrap();
    assert_eq!(ctx.ledger.bootstrap_weight_max_blocks(), 1000);
    assert_eq!(ctx.ledger.weight(&Account::from(7)), Amount::raw(42));
}

#[test]
fn block_destination_source() {
    let ctx = LedgerContext::empty();
    let ledger = &ctx.ledger;
    let mut txn = ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();
    let dest_account = Account::from(1000);

    let mut send_to_dest = genesis.legacy_send(&txn).destination(dest_account).build();
    ctx.ledger.process(&mut txn, &mut send_to_dest).unwrap();

    let mut send_to_self = genesis
        .legacy_send(&txn)
        .destination(genesis.account())
        .build();
    ctx.ledger.process(&mut txn, &mut send_to_self).unwrap();

    let mut receive = genesis.legacy_receive(&txn, send_to_self.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive).unwrap();

    let mut send_to_dest_2 = genesis.send(&txn).link(dest_account).build();
    ctx.ledger.process(&mut txn, &mut send_to_dest_2).unwrap();

    let mut send_to_self_2 = genesis.send(&txn).link(genesis.account()).build();
    ctx.ledger.process(&mut txn, &mut send_to_self_2).unwrap();

    let mut receive2 = genesis.receive(&txn, send_to_self_2.hash()).build();
    ctx.ledger.process(&mut txn, &mut receive2).unwrap();

    assert_eq!(
        ledger.balance(&txn, &receive2.hash()),
        receive2.balance()
    );

    assert_eq!(ledger.block_destination(&txn, &send_to_dest), dest_account);
    assert_eq!(ledger.block_source(&txn, &send_to_dest), BlockHash::zero());

    assert_eq!(
        ledger.block_destination(&txn, &send_to_self),
        *DEV_GENESIS_ACCOUNT
    );
    assert_eq!(ledger.block_source(&txn, &send_to_self), BlockHash::zero());

    assert_eq!(ledger.block_destination(&txn, &receive), Account::zero());
    assert_eq!(ledger.block_source(&txn, &receive), send_to_self.hash());

    assert_eq!(
        ledger.block_destination(&txn, &send_to_dest_2),
        dest_account
    );
    assert_eq!(ledger.block_source(&txn, &send_to_dest_2), BlockHash::zero());

    assert_eq!(
        ledger.block_destination(&txn, &send_to_self_2),
        *DEV_GENESIS_ACCOUNT
    );
    assert_eq!(
        ledger.block_source(&txn, &send_to_self_2),
        BlockHash::zero()
    );

    assert_eq!(ledger.block_destination(&txn, &receive2), Account::zero());
    assert_eq!(ledger.block_source(&txn, &receive2), send_to_self_2.hash());
}

#[test]
fn representative_block_hash_walks_back() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send = genesis
        .legacy_send(&txn)
        .destination(genesis.account())
        .build();
    ctx.ledger.process(&mut txn, &mut send).unwrap();

    // send blocks carry no representative, the walk continues to genesis
    assert_eq!(
        ctx.ledger.representative_block_hash(&txn, &send.hash()),
        *DEV_GENESIS_HASH
    );

    let mut change = genesis.legacy_change(&txn).build();
    ctx.ledger.process(&mut txn, &mut change).unwrap();
    assert_eq!(
        ctx.ledger.representative_block_hash(&txn, &change.hash()),
        change.hash()
    );
}
