use super::LedgerContext;
use crate::UncheckedMap;
use rsbtcnew_core::{
    utils::seconds_since_epoch, Block, BlockHash, UncheckedInfo, UncheckedKey,
};

#[test]
fn put_and_trigger() {
    let ctx = LedgerContext::empty();
    let unchecked = UncheckedMap::new(ctx.ledger.store.clone());
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    // the successor arrives before its dependency is known
    let send = genesis.legacy_send(&txn).build();
    let dependency = send.previous();
    unchecked.put(&mut txn, dependency, &UncheckedInfo::new(send.clone()));

    assert_eq!(unchecked.count(&txn), 1);
    assert!(unchecked.exists(&txn, &UncheckedKey::new(dependency, send.hash())));
    assert_eq!(unchecked.get(&txn, &dependency).len(), 1);
    assert_eq!(unchecked.get(&txn, &BlockHash::from(99999)).len(), 0);

    // committing the dependency wakes the buffered block exactly once
    let woken = unchecked.trigger(&mut txn, &dependency);
    assert_eq!(woken.len(), 1);
    assert_eq!(woken[0].block, send);
    assert_eq!(unchecked.count(&txn), 0);
    assert!(unchecked.trigger(&mut txn, &dependency).is_empty());
}

#[test]
fn woken_blocks_can_be_processed() {
    let ctx = LedgerContext::empty();
    let unchecked = UncheckedMap::new(ctx.ledger.store.clone());
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let mut send1 = genesis.legacy_send(&txn).build();
    let mut send2 = genesis
        .legacy_send(&txn)
        .previous(send1.hash())
        .previous_balance(genesis.info(&txn).unwrap().balance - rsbtcnew_core::Amount::raw(1))
        .build();

    // send2 arrives first and has to wait for send1
    unchecked.put(&mut txn, send2.previous(), &UncheckedInfo::new(send2.clone()));
    assert!(!ctx.ledger.could_fit(&txn, &send2));

    ctx.ledger.process(&mut txn, &mut send1).unwrap();
    assert!(ctx.ledger.could_fit(&txn, &send2));

    for entry in unchecked.trigger(&mut txn, &send1.hash()) {
        let mut block = entry.block;
        ctx.ledger.process(&mut txn, &mut block).unwrap();
    }
    assert!(ctx.ledger.block_exists(&txn, &send2.hash()));
}

#[test]
fn cleanup_deletes_only_stale_entries() {
    let ctx = LedgerContext::empty();
    let unchecked = UncheckedMap::new(ctx.ledger.store.clone());
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    let fresh = genesis.legacy_send(&txn).build();
    let mut stale_info = UncheckedInfo::new(fresh.clone());
    stale_info.modified = seconds_since_epoch() - 3600;
    unchecked.put(&mut txn, BlockHash::from(1), &stale_info);

    let fresh_info = UncheckedInfo::new(fresh);
    unchecked.put(&mut txn, BlockHash::from(2), &fresh_info);

    let cutoff = seconds_since_epoch() - 60;
    let deleted = unchecked.cleanup(&mut txn, cutoff, 1024);
    assert_eq!(deleted, 1);
    assert_eq!(unchecked.count(&txn), 1);
    assert!(!unchecked.exists(
        &txn,
        &UncheckedKey::new(BlockHash::from(1), stale_info.block.hash())
    ));
}

#[test]
fn cleanup_respects_the_batch_limit() {
    let ctx = LedgerContext::empty();
    let unchecked = UncheckedMap::new(ctx.ledger.store.clone());
    let mut txn = ctx.ledger.rw_txn();
    let genesis = ctx.genesis_block_factory();

    for i in 0..4u64 {
        let block = genesis.legacy_send(&txn).build();
        let mut info = UncheckedInfo::new(block);
        info.modified = 1;
        unchecked.put(&mut txn, BlockHash::from(i), &info);
    }

    let deleted = unchecked.cleanup(&mut txn, seconds_since_epoch(), 2);
    assert_eq!(deleted, 2);
    assert_eq!(unchecked.count(&txn), 2);
}
