// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{pin::pin, time::Duration};

use assert_matches::assert_matches;
use futures::FutureExt as _;
use test_case::test_case;

use super::*;
use crate::{
    memory::{LedgerConfig, MemoryLedger},
    property::{PropertyDraft, PropertyState, PropertyType},
    test_utils::{
        dummy_account, dummy_package, GatedClient, ScriptedSigner, SignerStep, StaticAccounts,
    },
};

fn counter_id() -> ObjectId {
    "0xabc".parse().unwrap()
}

/// A ledger with one counter at `0xabc`, and the wallet connected to its owner.
struct TestSetup {
    ledger: MemoryLedger,
    signer: Arc<ScriptedSigner<MemoryLedger>>,
    owner: AccountAddress,
}

impl TestSetup {
    fn new(config: LedgerConfig) -> Self {
        let ledger = MemoryLedger::new(config);
        let owner = dummy_account(1);
        ledger.connect(owner);
        ledger.insert_counter(dummy_package(1), counter_id(), 5, owner);
        TestSetup {
            signer: Arc::new(ScriptedSigner::from(ledger.clone())),
            ledger,
            owner,
        }
    }

    fn coordinator<State: ObjectState>(
        &self,
        package: ObjectId,
    ) -> SubmissionCoordinator<MemoryLedger, State> {
        SubmissionCoordinator::new(
            TransactionBuilder::new(package),
            self.signer.clone(),
            Arc::new(self.ledger.clone()),
            Arc::new(ReadStateCache::new(self.ledger.clone())),
        )
    }

    fn counter(&self) -> SubmissionCoordinator<MemoryLedger, CounterState> {
        self.coordinator(dummy_package(1)).with_object(counter_id())
    }
}

impl Default for TestSetup {
    fn default() -> Self {
        TestSetup::new(LedgerConfig::default())
    }
}

#[test_log::test(tokio::test(start_paused = true))]
async fn increment_reports_the_post_state_from_the_ledger() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    assert_eq!(counter.current_snapshot().await?.value, 5);

    let confirmation = counter.submit(CallIntent::Increment).await?;

    assert_eq!(confirmation.object_id, counter_id());
    assert_eq!(confirmation.snapshot.value, 6);
    assert_eq!(confirmation.effects.mutated, vec![counter_id()]);
    assert_eq!(confirmation.created_object(), None);
    assert_eq!(counter.current_snapshot().await?.value, 6);
    assert_eq!(counter.state(), SubmissionState::Idle);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn confirmed_submissions_refetch_instead_of_serving_the_cache() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    assert_eq!(counter.current_snapshot().await?.value, 5);

    // Someone else moves the counter; the cache doesn't know yet.
    setup
        .ledger
        .insert_counter(dummy_package(1), counter_id(), 41, setup.owner);
    assert_eq!(counter.current_snapshot().await?.value, 5);

    let confirmation = counter.submit(CallIntent::Increment).await?;

    assert_eq!(confirmation.snapshot.value, 42);
    assert_eq!(counter.current_snapshot().await?.value, 42);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_reads_do_not_overwrite_the_confirmed_snapshot() -> anyhow::Result<()> {
    let ledger = MemoryLedger::default();
    let owner = dummy_account(1);
    ledger.connect(owner);
    ledger.insert_counter(dummy_package(1), counter_id(), 5, owner);
    let client = GatedClient::from(ledger.clone());
    let counter = SubmissionCoordinator::<_, CounterState>::new(
        TransactionBuilder::new(dummy_package(1)),
        Arc::new(ledger.clone()),
        Arc::new(ledger.clone()),
        Arc::new(ReadStateCache::new(client.clone())),
    )
    .with_object(counter_id());

    // A render reads the counter before the increment, but its answer arrives afterwards.
    let release = client.hold_next_read();
    let mut render = pin!(counter.current_snapshot());
    assert!(render.as_mut().now_or_never().is_none());

    let confirmation = counter.submit(CallIntent::Increment).await?;
    assert_eq!(confirmation.snapshot.value, 6);

    release.send(()).expect("Held read should still be waiting");
    assert_eq!(render.await?.value, 6);
    assert_eq!(counter.current_snapshot().await?.value, 6);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submissions_are_rejected_while_one_is_pending() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    let release = setup.signer.hold_next();

    let mut increment = pin!(counter.submit(CallIntent::Increment));
    assert!(increment.as_mut().now_or_never().is_none());
    assert_eq!(
        counter.state(),
        SubmissionState::Submitting(IntentKind::Increment)
    );
    assert_eq!(counter.pending_intent(), Some(IntentKind::Increment));

    assert_matches!(
        counter.submit(CallIntent::Reset(0)).await,
        Err(SubmissionError::Busy {
            pending: IntentKind::Increment
        })
    );
    assert_eq!(setup.signer.calls(), 1);

    release.send(()).expect("Held submission should still be waiting");
    let confirmation = increment.await?;

    assert_eq!(confirmation.snapshot.value, 6);
    assert_eq!(counter.state(), SubmissionState::Idle);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submissions_are_rejected_while_waiting_for_finality() -> anyhow::Result<()> {
    let setup = TestSetup::new(LedgerConfig {
        finality_delay: Duration::from_secs(2),
        ..LedgerConfig::default()
    });
    let counter = setup.counter();

    let mut increment = pin!(counter.submit(CallIntent::Increment));
    assert!(increment.as_mut().now_or_never().is_none());
    assert_eq!(setup.ledger.pending_transactions(), 1);

    assert_matches!(
        counter.submit(CallIntent::Increment).await,
        Err(SubmissionError::Busy { .. })
    );
    assert_eq!(setup.signer.calls(), 1);

    increment.await?;
    assert_eq!(counter.current_snapshot().await?.value, 6);
    Ok(())
}

#[test_case(SignerStep::Reject("declined".into()); "when signing is rejected")]
#[test_case(SignerStep::FailBroadcast("connection reset".into()); "when broadcast fails")]
#[tokio::test(start_paused = true)]
async fn wallet_failures_leave_state_and_cache_untouched(step: SignerStep) -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    let before = counter.current_snapshot().await?;
    setup.signer.then(step);

    let error = counter
        .submit(CallIntent::Increment)
        .await
        .expect_err("Submission should fail");

    assert_matches!(
        error,
        SubmissionError::SigningRejected(_) | SubmissionError::BroadcastFailed(_)
    );
    assert_eq!(error.digest(), None);
    assert_eq!(counter.state(), SubmissionState::Idle);
    assert!(counter.read_state().contains(&counter_id()));
    assert_eq!(counter.current_snapshot().await?, before);
    assert_eq!(setup.ledger.pending_transactions(), 0);

    // The action can be offered again.
    assert_eq!(counter.submit(CallIntent::Increment).await?.snapshot.value, 6);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeouts_are_surfaced_without_retrying() -> anyhow::Result<()> {
    let setup = TestSetup::new(LedgerConfig {
        finality_delay: Duration::from_secs(120),
        confirmation_timeout: Duration::from_secs(30),
    });
    let counter = setup.counter();

    let error = counter
        .submit(CallIntent::Increment)
        .await
        .expect_err("Finality should not be observed in time");

    assert_matches!(error, SubmissionError::ConfirmationTimeout { .. });
    assert!(error.digest().is_some());
    assert_eq!(setup.signer.calls(), 1);
    assert_eq!(counter.state(), SubmissionState::Idle);
    assert_eq!(counter.current_snapshot().await?.value, 5);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn execution_failures_leave_the_cache_untouched() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let stranger = dummy_account(9);
    setup.ledger.connect(stranger);
    let counter = setup.counter();
    assert!(!counter.can_reset().await?);

    let error = counter
        .submit(CallIntent::Reset(0))
        .await
        .expect_err("Only the owner may reset");

    assert_matches!(error, SubmissionError::ExecutionFailed { .. });
    assert_eq!(counter.current_snapshot().await?.value, 5);
    assert_eq!(counter.state(), SubmissionState::Idle);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn owners_can_reset() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    assert!(counter.can_reset().await?);

    let confirmation = counter.submit(CallIntent::Reset(0)).await?;

    assert_eq!(confirmation.snapshot.value, 0);
    assert_eq!(confirmation.snapshot.owner, setup.owner);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn create_returns_a_fresh_object_with_a_snapshot() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let creator = setup.coordinator::<CounterState>(dummy_package(1));

    let confirmation = creator.submit(CallIntent::Create).await?;

    let created = confirmation
        .created_object()
        .expect("Create should report the new counter");
    assert_ne!(created, counter_id());
    assert_ne!(created.as_bytes(), confirmation.digest.as_bytes());
    assert_eq!(Some(created), confirmation.effects.first_created());
    assert!(creator.read_state().contains(&created));
    assert_eq!(
        creator.snapshot(created).await?,
        CounterState {
            value: 0,
            owner: setup.owner
        }
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submissions_require_a_connected_account() {
    let ledger = MemoryLedger::default();
    let signer = Arc::new(ScriptedSigner::from(ledger.clone()));
    let creator = SubmissionCoordinator::<_, CounterState>::new(
        TransactionBuilder::new(dummy_package(1)),
        signer.clone(),
        Arc::new(StaticAccounts(None)),
        Arc::new(ReadStateCache::new(ledger)),
    );

    assert_matches!(
        creator.submit(CallIntent::Create).await,
        Err(SubmissionError::NoAccount)
    );
    assert_eq!(signer.calls(), 0);
    assert_eq!(creator.state(), SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn abandoned_submissions_release_the_pending_flag() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let counter = setup.counter();
    let _release = setup.signer.hold_next();

    {
        let mut increment = pin!(counter.submit(CallIntent::Increment));
        assert!(increment.as_mut().now_or_never().is_none());
        assert_eq!(counter.pending_intent(), Some(IntentKind::Increment));
    }

    assert_eq!(counter.state(), SubmissionState::Idle);
    assert_eq!(counter.submit(CallIntent::Increment).await?.snapshot.value, 6);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn properties_are_identified_by_the_created_object() -> anyhow::Result<()> {
    let setup = TestSetup::default();
    let registry = setup.coordinator::<PropertyState>(dummy_package(2));
    let draft = PropertyDraft {
        title: "Nhà 3 tầng view biển".to_owned(),
        description: "Nhà đẹp, vị trí thuận lợi".to_owned(),
        location: "123 Trần Hưng Đạo, Đà Nẵng".to_owned(),
        price: 5_000_000,
        area: 120,
        property_type: PropertyType::House,
        image_url: "https://example.com/image.jpg".to_owned(),
    };

    let confirmation = registry
        .submit(CallIntent::CreateProperty(draft.clone()))
        .await?;

    assert_eq!(confirmation.created_object(), Some(confirmation.object_id));
    let property = &confirmation.snapshot;
    assert_eq!(property.title, draft.title);
    assert_eq!(property.price, draft.price);
    assert_eq!(property.property_type, PropertyType::House);
    assert!(property.is_available);
    assert_eq!(property.owner, setup.owner);
    Ok(())
}
