// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::pin::pin;

use assert_matches::assert_matches;
use futures::FutureExt as _;
use realty_base::data_types::{ObjectData, Owner};
use serde_json::json;

use super::*;
use crate::{
    memory::MemoryLedger,
    property::PropertyState,
    test_utils::{dummy_account, dummy_package, GatedClient},
};

fn counter_id() -> ObjectId {
    "0xabc".parse().unwrap()
}

#[tokio::test(start_paused = true)]
async fn cached_snapshots_are_served_until_invalidated() -> Result<(), ReadStateError> {
    let ledger = MemoryLedger::default();
    ledger.insert_counter(dummy_package(1), counter_id(), 5, dummy_account(1));
    let cache = ReadStateCache::<_, CounterState>::new(ledger.clone());

    assert!(!cache.contains(&counter_id()));
    assert_eq!(cache.get(counter_id()).await?.value, 5);
    assert!(cache.contains(&counter_id()));

    ledger.insert_counter(dummy_package(1), counter_id(), 9, dummy_account(1));
    assert_eq!(cache.get(counter_id()).await?.value, 5);

    cache.invalidate(&counter_id());
    assert!(!cache.contains(&counter_id()));
    assert_eq!(cache.get(counter_id()).await?.value, 9);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn refresh_bypasses_the_cached_snapshot() -> Result<(), ReadStateError> {
    let ledger = MemoryLedger::default();
    ledger.insert_counter(dummy_package(1), counter_id(), 1, dummy_account(1));
    let cache = ReadStateCache::<_, CounterState>::new(ledger.clone());

    cache.get(counter_id()).await?;
    ledger.insert_counter(dummy_package(1), counter_id(), 2, dummy_account(2));

    let state = cache.refresh(counter_id()).await?;
    assert_eq!(
        state,
        CounterState {
            value: 2,
            owner: dummy_account(2)
        }
    );
    assert_eq!(cache.get(counter_id()).await?, state);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reads_started_before_an_invalidation_are_not_cached() -> Result<(), ReadStateError> {
    let ledger = MemoryLedger::default();
    ledger.insert_counter(dummy_package(1), counter_id(), 1, dummy_account(1));
    let client = GatedClient::from(ledger.clone());
    let cache = ReadStateCache::<_, CounterState>::new(client.clone());

    let release = client.hold_next_read();
    let mut read = pin!(cache.get(counter_id()));
    assert!(read.as_mut().now_or_never().is_none());

    ledger.insert_counter(dummy_package(1), counter_id(), 2, dummy_account(1));
    cache.invalidate(&counter_id());
    release.send(()).expect("Held read should still be waiting");

    assert_eq!(read.await?.value, 1);
    assert!(!cache.contains(&counter_id()));
    assert_eq!(cache.get(counter_id()).await?.value, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn older_versions_do_not_replace_newer_snapshots() -> Result<(), ReadStateError> {
    let ledger = MemoryLedger::default();
    ledger.insert_counter(dummy_package(1), counter_id(), 1, dummy_account(1));
    let client = GatedClient::from(ledger.clone());
    let cache = ReadStateCache::<_, CounterState>::new(client.clone());

    // Both reads miss the cache; the first one answers with the older version, last.
    let release = client.hold_next_read();
    let mut slow = pin!(cache.get(counter_id()));
    assert!(slow.as_mut().now_or_never().is_none());
    ledger.insert_counter(dummy_package(1), counter_id(), 2, dummy_account(1));
    assert_eq!(cache.get(counter_id()).await?.value, 2);

    release.send(()).expect("Held read should still be waiting");
    assert_eq!(slow.await?.value, 2);
    assert_eq!(cache.get(counter_id()).await?.value, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_objects_are_not_found_and_not_cached() {
    let cache = ReadStateCache::<_, CounterState>::new(MemoryLedger::default());

    assert_matches!(
        cache.get(counter_id()).await,
        Err(ReadStateError::NotFound(object_id)) if object_id == counter_id()
    );
    assert!(!cache.contains(&counter_id()));
}

#[tokio::test(start_paused = true)]
async fn objects_of_another_type_are_rejected() {
    let ledger = MemoryLedger::default();
    ledger.insert_counter(dummy_package(1), counter_id(), 1, dummy_account(1));
    let cache = ReadStateCache::<_, PropertyState>::new(ledger);

    assert_matches!(
        cache.get(counter_id()).await,
        Err(ReadStateError::UnexpectedType { expected, .. }) if expected == "real_estate::Property"
    );
}

#[test]
fn counter_state_accepts_string_and_number_values() {
    let mut object = ObjectData {
        object_id: counter_id(),
        version: 3,
        owner: Owner::Shared,
        type_name: "0x1::counter::Counter".to_owned(),
        fields: serde_json::Map::new(),
    };
    object.fields.insert("value".into(), json!("6"));
    object
        .fields
        .insert("owner".into(), json!(dummy_account(4).to_string()));
    assert_eq!(CounterState::decode(&object).unwrap().value, 6);

    object.fields.insert("value".into(), json!(7));
    assert_eq!(CounterState::decode(&object).unwrap().value, 7);

    object.fields.remove("owner");
    assert_matches!(
        CounterState::decode(&object),
        Err(ReadStateError::InvalidContent { .. })
    );
}
