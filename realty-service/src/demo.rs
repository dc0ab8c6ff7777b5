// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A walk through every submission flow, against the in-memory ledger.

use std::sync::Arc;

use anyhow::{bail, Context as _};
use realty_base::identifiers::{AccountAddress, ObjectId};
use realty_core::{
    memory::MemoryLedger,
    property::{Listing, ListingCatalog, PropertyDraft, PropertyState},
    AccountProvider, CallIntent, CounterState, IntentKind, ReadStateCache, Signer,
    SubmissionCoordinator, TransactionBuilder,
};
use tracing::info;

use crate::config::RealtyConfig;

/// What the demo observed.
#[derive(Clone, Debug)]
pub struct DemoReport {
    pub counter: ObjectId,
    /// The counter value confirmed after each submission.
    pub counter_values: Vec<(IntentKind, u64)>,
    pub listing: Listing,
    pub catalog: ListingCatalog,
}

/// Creates a counter, increments and resets it, then registers a property modeled on the first
/// configured listing.
pub async fn run(config: &RealtyConfig, account: AccountAddress) -> anyhow::Result<DemoReport> {
    let ledger = MemoryLedger::new(config.ledger_config());
    ledger.connect(account);
    let signer: Arc<dyn Signer> = Arc::new(ledger.clone());
    let accounts: Arc<dyn AccountProvider> = Arc::new(ledger.clone());

    let counter_builder = TransactionBuilder::new(config.packages.counter_package());
    let counters = Arc::new(ReadStateCache::<_, CounterState>::new(ledger.clone()));
    let creator = SubmissionCoordinator::new(
        counter_builder,
        signer.clone(),
        accounts.clone(),
        counters.clone(),
    );

    let created = creator.submit(CallIntent::Create).await?;
    let counter_id = created.object_id;
    info!(counter = %counter_id, value = created.snapshot.value, "Counter created");
    let mut counter_values = vec![(created.kind, created.snapshot.value)];

    let counter =
        SubmissionCoordinator::new(counter_builder, signer.clone(), accounts.clone(), counters)
            .with_object(counter_id);
    for intent in [CallIntent::Increment, CallIntent::Increment] {
        let confirmation = counter.submit(intent).await?;
        info!(value = confirmation.snapshot.value, "Counter incremented");
        counter_values.push((confirmation.kind, confirmation.snapshot.value));
    }
    if !counter.can_reset().await? {
        bail!("Account {account} does not own counter {counter_id}");
    }
    let reset = counter.submit(CallIntent::Reset(0)).await?;
    info!(value = reset.snapshot.value, "Counter reset");
    counter_values.push((reset.kind, reset.snapshot.value));

    let template = config
        .listings
        .first()
        .context("The configuration has no listing to register")?;
    let draft = draft_from(template);
    draft.validate()?;
    let registry = SubmissionCoordinator::new(
        TransactionBuilder::new(config.packages.property),
        signer,
        accounts,
        Arc::new(ReadStateCache::<_, PropertyState>::new(ledger)),
    );
    let registered = registry.submit(CallIntent::CreateProperty(draft)).await?;
    let listing = Listing::from_state(registered.object_id, registered.snapshot);
    info!(property = %listing.id, title = %listing.title, "Property registered");

    let mut catalog = config.catalog();
    catalog.upsert(listing.clone());

    Ok(DemoReport {
        counter: counter_id,
        counter_values,
        listing,
        catalog,
    })
}

fn draft_from(listing: &Listing) -> PropertyDraft {
    PropertyDraft {
        title: listing.title.clone(),
        description: listing.description.clone(),
        location: listing.location.clone(),
        price: listing.price,
        area: listing.area,
        property_type: listing.property_type,
        image_url: listing.image_url.clone(),
    }
}
