// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use test_case::test_case;

use super::*;

const MINIMAL: &str = r#"
network = "localnet"
confirmation_timeout_ms = 500
finality_delay_ms = 0

[packages]
counter = "0xc0"
property = "0x1"
marketplace = "0x2"
escrow = "0x3"
marketplace_object = "0x4"

[[listings]]
id = "0x789"
title = "Đất nền ven sông"
location = "Cần Thơ"
price = 750000
area = 300
property_type = 2
image_url = ""
is_available = false
"#;

#[test]
fn defaults_point_at_the_deployed_packages() {
    let config = RealtyConfig::default();

    assert_eq!(config.network, "testnet");
    assert_eq!(config.packages.property.to_string(), PROPERTY_PACKAGE);
    assert_eq!(config.packages.escrow.to_string(), ESCROW_PACKAGE);
    assert_eq!(
        config.packages.marketplace_object.to_string(),
        MARKETPLACE_OBJECT
    );
    assert_eq!(config.packages.counter_package(), config.packages.property);
    assert_eq!(config.ledger_config(), LedgerConfig::default());

    let catalog = config.catalog();
    assert_eq!(catalog.all().len(), 2);
    assert_eq!(catalog.available().count(), 2);
    assert_eq!(
        catalog.get(&"0x456".parse().unwrap()).map(|listing| listing.property_type),
        Some(PropertyType::Apartment)
    );
}

#[test]
fn defaults_survive_a_round_trip_through_a_file() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("realty.toml");

    RealtyConfig::default().write(&path)?;

    assert_eq!(RealtyConfig::read(&path)?, RealtyConfig::default());
    Ok(())
}

#[test]
fn files_override_every_value() -> anyhow::Result<()> {
    let config: RealtyConfig = toml::from_str(MINIMAL)?;
    config.validate()?;

    assert_eq!(config.packages.counter_package(), "0xc0".parse()?);
    assert_eq!(
        config.ledger_config(),
        LedgerConfig {
            finality_delay: Duration::ZERO,
            confirmation_timeout: Duration::from_millis(500),
        }
    );
    let listing = &config.listings[0];
    assert_eq!(listing.property_type, PropertyType::Land);
    assert!(listing.description.is_empty());
    assert_eq!(listing.owner, None);
    assert_eq!(config.catalog().available().count(), 0);
    Ok(())
}

#[test]
fn missing_files_are_reported() {
    let directory = tempfile::tempdir().unwrap();
    assert_matches!(
        RealtyConfig::read(&directory.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    );
    assert_matches!(RealtyConfig::read_or_default(None), Ok(config) if config == RealtyConfig::default());
}

#[test_case("network = \"testnet\"\nunknown = 1\n"; "unknown fields")]
#[test_case("network = \"testnet\"\n"; "missing sections")]
fn malformed_files_are_rejected(contents: &str) {
    assert_matches!(
        toml::from_str::<RealtyConfig>(contents).map_err(ConfigError::from),
        Err(ConfigError::Parse(_))
    );
}

#[test]
fn unknown_property_types_are_rejected() {
    let contents = MINIMAL.replace("property_type = 2", "property_type = 7");
    assert!(toml::from_str::<RealtyConfig>(&contents).is_err());
}

#[test]
fn zero_timeouts_are_rejected() {
    let mut config = RealtyConfig::default();
    config.confirmation_timeout_ms = 0;
    assert_matches!(
        config.validate(),
        Err(ConfigError::ZeroDuration("confirmation_timeout_ms"))
    );
}

#[test]
fn duplicate_listings_are_rejected() {
    let mut config = RealtyConfig::default();
    let duplicate = config.listings[0].clone();
    config.listings.push(duplicate.clone());
    assert_matches!(
        config.validate(),
        Err(ConfigError::DuplicateListing(id)) if id == duplicate.id
    );
}
