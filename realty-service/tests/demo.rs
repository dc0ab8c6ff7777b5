// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use realty_base::identifiers::AccountAddress;
use realty_core::IntentKind;
use realty_service::{config::RealtyConfig, demo};

fn account() -> AccountAddress {
    "0xabc".parse().unwrap()
}

#[tokio::test(start_paused = true)]
async fn demo_confirms_every_flow() -> anyhow::Result<()> {
    let config = RealtyConfig::default();

    let report = demo::run(&config, account()).await?;

    assert_eq!(
        report.counter_values,
        vec![
            (IntentKind::Create, 0),
            (IntentKind::Increment, 1),
            (IntentKind::Increment, 2),
            (IntentKind::Reset, 0),
        ]
    );

    let template = &config.listings[0];
    assert_eq!(report.listing.title, template.title);
    assert_eq!(report.listing.price, template.price);
    assert_eq!(report.listing.owner, Some(account()));
    assert!(report.listing.is_available);
    assert_ne!(report.listing.id, report.counter);

    assert_eq!(report.catalog.all().len(), config.listings.len() + 1);
    assert_eq!(report.catalog.get(&report.listing.id), Some(&report.listing));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn demo_needs_a_listing_to_register() {
    let config = RealtyConfig {
        listings: Vec::new(),
        ..RealtyConfig::default()
    };

    let error = demo::run(&config, account())
        .await
        .expect_err("Registration needs a template listing");
    assert!(error.to_string().contains("no listing"));
}

#[tokio::test(start_paused = true)]
async fn demo_reports_timeouts() {
    let config = RealtyConfig {
        finality_delay_ms: 60_000,
        confirmation_timeout_ms: 1_000,
        ..RealtyConfig::default()
    };

    let error = demo::run(&config, account())
        .await
        .expect_err("Finality is slower than the timeout");
    assert!(error.to_string().contains("Timed out"));
}
