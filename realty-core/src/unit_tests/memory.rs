// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;

use super::*;
use crate::{
    read_state::{CounterState, ObjectState},
    test_utils::{dummy_account, dummy_package},
    transaction::{CallIntent, TransactionBuilder},
};

fn counter_id() -> ObjectId {
    "0xabc".parse().unwrap()
}

fn transaction(sender: AccountAddress, intent: CallIntent) -> Transaction {
    let call = TransactionBuilder::new(dummy_package(1)).build(&intent, Some(counter_id()));
    Transaction { sender, call }
}

async fn counter(ledger: &MemoryLedger, object_id: ObjectId) -> CounterState {
    let object = ledger
        .get_object(object_id)
        .await
        .expect("Memory ledger reads never fail")
        .expect("Counter should exist");
    CounterState::decode(&object).expect("Counter should decode")
}

#[tokio::test(start_paused = true)]
async fn transactions_take_effect_at_finality() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let owner = dummy_account(1);
    ledger.connect(owner);
    ledger.insert_counter(dummy_package(1), counter_id(), 5, owner);

    let digest = ledger
        .sign_and_execute(transaction(owner, CallIntent::Increment))
        .await?;
    assert_eq!(ledger.pending_transactions(), 1);
    assert_eq!(counter(&ledger, counter_id()).await.value, 5);

    let effects = ledger.wait_for_finality(digest).await?;
    assert_eq!(effects.status, ExecutionStatus::Success);
    assert_eq!(effects.mutated, vec![counter_id()]);
    assert_eq!(ledger.pending_transactions(), 0);
    assert_eq!(counter(&ledger, counter_id()).await.value, 6);

    // Effects stay available after finality.
    assert_eq!(ledger.wait_for_finality(digest).await?, effects);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn created_counters_are_owned_by_the_sender() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let sender = dummy_account(2);
    ledger.connect(sender);

    let digest = ledger
        .sign_and_execute(transaction(sender, CallIntent::Create))
        .await?;
    let effects = ledger.wait_for_finality(digest).await?;

    let created = effects.first_created().expect("A counter should be created");
    assert_eq!(created, ObjectId::derive(&digest, 0));
    assert_eq!(
        counter(&ledger, created).await,
        CounterState {
            value: 0,
            owner: sender
        }
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn only_the_owner_can_set_the_value() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let owner = dummy_account(1);
    let stranger = dummy_account(2);
    ledger.insert_counter(dummy_package(1), counter_id(), 5, owner);
    ledger.connect(stranger);

    let digest = ledger
        .sign_and_execute(transaction(stranger, CallIntent::Reset(0)))
        .await?;
    let effects = ledger.wait_for_finality(digest).await?;

    assert_matches!(effects.status, ExecutionStatus::Failure { error } if error.contains("owner"));
    assert!(effects.mutated.is_empty());
    assert_eq!(counter(&ledger, counter_id()).await.value, 5);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn incrementing_past_the_maximum_aborts() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let owner = dummy_account(1);
    ledger.connect(owner);
    ledger.insert_counter(dummy_package(1), counter_id(), u64::MAX, owner);

    let digest = ledger
        .sign_and_execute(transaction(owner, CallIntent::Increment))
        .await?;

    assert_matches!(
        ledger.wait_for_finality(digest).await?.status,
        ExecutionStatus::Failure { .. }
    );
    assert_eq!(counter(&ledger, counter_id()).await.value, u64::MAX);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_entry_points_abort() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let sender = dummy_account(1);
    ledger.connect(sender);
    let mut transaction = transaction(sender, CallIntent::Create);
    transaction.call.function = "destroy".to_owned();

    let digest = ledger.sign_and_execute(transaction).await?;

    assert_matches!(
        ledger.wait_for_finality(digest).await?.status,
        ExecutionStatus::Failure { error } if error.contains("destroy")
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn the_wallet_only_signs_for_the_connected_account() {
    let ledger = MemoryLedger::default();
    let transaction = transaction(dummy_account(1), CallIntent::Create);

    assert_matches!(
        ledger.sign_and_execute(transaction.clone()).await,
        Err(SignerError::Rejected(_))
    );

    ledger.connect(dummy_account(2));
    assert_matches!(
        ledger.sign_and_execute(transaction).await,
        Err(SignerError::Rejected(_))
    );

    ledger.disconnect();
    assert_eq!(ledger.current_account(), None);
}

#[tokio::test(start_paused = true)]
async fn slow_finality_times_out() -> anyhow::Result<()> {
    let ledger = MemoryLedger::new(LedgerConfig {
        finality_delay: Duration::from_secs(60),
        confirmation_timeout: Duration::from_secs(5),
    });
    let sender = dummy_account(1);
    ledger.connect(sender);

    let digest = ledger
        .sign_and_execute(transaction(sender, CallIntent::Create))
        .await?;
    let started = Instant::now();

    assert_eq!(
        ledger.wait_for_finality(digest).await,
        Err(ChainClientError::Timeout { digest })
    );
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_transactions_are_reported() {
    let ledger = MemoryLedger::default();
    let digest = TransactionDigest::new([9; 32]);

    assert_eq!(
        ledger.wait_for_finality(digest).await,
        Err(ChainClientError::UnknownTransaction { digest })
    );
}
