//! End-to-end engine tests
//!
//! Drive the full submit -> queue -> worker -> ledger path over in-memory
//! storage and observe the asynchronously applied outcomes.

mod common;

use std::sync::Arc;

use common::TestEngine;
use fundflow::{PoolConfig, TransactionStatus};

#[tokio::test]
async fn test_deposit_transfer_withdraw_scenario() {
    let engine = TestEngine::start();
    let (alice, bob) = (1, 2);

    // deposit lands asynchronously
    engine
        .service
        .submit(None, Some(alice), 1_000, "deposit")
        .await
        .unwrap();
    engine.wait_for_balance(alice, 1_000).await;

    // transfer moves half to bob
    engine
        .service
        .submit(Some(alice), Some(bob), 500, "transfer")
        .await
        .unwrap();
    engine.wait_for_balance(alice, 500).await;
    engine.wait_for_balance(bob, 500).await;

    // overdraw fails and leaves the balance untouched
    let overdraw = engine
        .service
        .submit(Some(alice), None, 10_000, "withdraw")
        .await
        .unwrap();
    engine
        .wait_for_status(overdraw.id, TransactionStatus::Failed)
        .await;
    assert_eq!(engine.ledger.balance(alice).await.unwrap().amount, 500);
    assert_eq!(engine.ledger.balance(bob).await.unwrap().amount, 500);

    engine.pool.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_do_not_lose_updates() {
    let engine = TestEngine::start();

    let (a, b) = tokio::join!(
        engine.service.submit(None, Some(1), 100, "deposit"),
        engine.service.submit(None, Some(1), 100, "deposit"),
    );
    a.unwrap();
    b.unwrap();

    engine.wait_for_balance(1, 200).await;

    let stats = engine.pool.shutdown().await;
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_unknown_account_balance_is_zero() {
    let engine = TestEngine::start();

    let balance = engine.ledger.balance(99).await.unwrap();
    assert_eq!(balance.amount, 0);

    engine.pool.shutdown().await;
}

#[tokio::test]
async fn test_small_queue_drops_nothing() {
    // queue far smaller than the workload: submissions block rather than
    // discard, and every transaction still reaches a terminal status
    let engine = TestEngine::with_config(PoolConfig {
        workers: 2,
        queue_capacity: 4,
    });

    let mut ids = Vec::new();
    for i in 0..50i64 {
        let account = (i % 5) + 1;
        let tx = engine
            .service
            .submit(None, Some(account), 10, "deposit")
            .await
            .unwrap();
        ids.push(tx.id);
    }

    engine.wait_for_total(50).await;

    for id in ids {
        let tx = engine.service.transaction(id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    let stats = engine.pool.shutdown().await;
    assert_eq!(stats.processed, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_funds() {
    let engine = Arc::new(TestEngine::start());

    for account in 1..=4i64 {
        engine
            .service
            .submit(None, Some(account), 1_000, "deposit")
            .await
            .unwrap();
    }
    engine.wait_for_total(4).await;

    let mut handles = Vec::new();
    for i in 0..60i64 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let from = (i % 4) + 1;
            let to = ((i + 1) % 4) + 1;
            engine
                .service
                .submit(Some(from), Some(to), 50, "transfer")
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    engine.wait_for_total(64).await;

    // transfers only move funds between the four accounts
    let mut total = 0;
    for account in 1..=4i64 {
        total += engine.ledger.balance(account).await.unwrap().amount;
    }
    assert_eq!(total, 4_000);

    engine.pool.shutdown().await;
}

#[tokio::test]
async fn test_invalid_amount_fails_asynchronously() {
    let engine = TestEngine::start();

    // accepted at submission, rejected by the ledger during processing
    let tx = engine
        .service
        .submit(None, Some(1), -5, "deposit")
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);

    engine.wait_for_status(tx.id, TransactionStatus::Failed).await;
    assert_eq!(engine.ledger.balance(1).await.unwrap().amount, 0);

    engine.pool.shutdown().await;
}

#[tokio::test]
async fn test_missing_participant_fails_asynchronously() {
    let engine = TestEngine::start();

    let tx = engine
        .service
        .submit(None, None, 100, "withdraw")
        .await
        .unwrap();

    engine.wait_for_status(tx.id, TransactionStatus::Failed).await;

    engine.pool.shutdown().await;
}

#[tokio::test]
async fn test_audit_trail_follows_mutations() {
    let engine = TestEngine::start();

    engine
        .service
        .submit(None, Some(1), 1_000, "deposit")
        .await
        .unwrap();
    engine.wait_for_balance(1, 1_000).await;

    engine
        .service
        .submit(Some(1), None, 300, "withdraw")
        .await
        .unwrap();
    engine.wait_for_balance(1, 700).await;

    let history = engine.ledger.history(1).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, "balance.debited");
    assert_eq!(history[1].action, "balance.credited");

    engine.pool.shutdown().await;
}

#[tokio::test]
async fn test_transaction_history_spans_both_roles() {
    let engine = TestEngine::start();

    engine
        .service
        .submit(None, Some(1), 500, "deposit")
        .await
        .unwrap();
    engine.wait_for_balance(1, 500).await;

    engine
        .service
        .submit(Some(1), Some(2), 200, "transfer")
        .await
        .unwrap();
    engine.wait_for_balance(2, 200).await;

    let history = engine.service.history(1).await.unwrap();
    assert_eq!(history.len(), 2);
    // newest first: the transfer precedes the deposit in the listing
    assert_eq!(history[0].amount, 200);
    assert_eq!(history[1].amount, 500);

    engine.pool.shutdown().await;
}
