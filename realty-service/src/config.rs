// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration of the `realty` client, read from a TOML file.

use std::{collections::BTreeSet, path::Path, time::Duration};

use realty_base::identifiers::ObjectId;
use realty_core::{
    memory::LedgerConfig,
    property::{Listing, ListingCatalog, PropertyType},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
#[path = "unit_tests/config.rs"]
mod tests;

const PROPERTY_PACKAGE: &str = "0x2ee861ccbdc2037ffa01250fdad78d94cd73f9e44b44cca5b82e249107a11edd";
const MARKETPLACE_PACKAGE: &str =
    "0x3597f5c17be5057c4c1be4e2301d5af33bebcf5bb89d53d9c7e2d7a377525959";
const ESCROW_PACKAGE: &str = "0xa53a4b57043d12512180a661615ee81f1bfd9dd0fa93939e154b7cc39e8ae2f6";
const MARKETPLACE_OBJECT: &str =
    "0xdba5c27664fd5eeb47d4277ab6996ea560826f7f93f5ce407df6388f73afa370";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200";

/// Module names of the deployed packages.
pub const MARKETPLACE_MODULE: &str = "property_marketplace";
pub const ESCROW_MODULE: &str = "property_escrow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading the configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Timeouts must be positive, but `{0}` is zero")]
    ZeroDuration(&'static str),

    #[error("Listing {0} appears more than once")]
    DuplicateListing(ObjectId),
}

/// The deployed packages the client talks to.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// The package of the counter module. The demo falls back to the property package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<ObjectId>,
    pub property: ObjectId,
    pub marketplace: ObjectId,
    pub escrow: ObjectId,
    /// The shared marketplace object.
    pub marketplace_object: ObjectId,
}

impl PackageConfig {
    /// Returns the package used for counter calls.
    pub fn counter_package(&self) -> ObjectId {
        self.counter.unwrap_or(self.property)
    }
}

/// The complete configuration of the `realty` client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtyConfig {
    pub network: String,
    pub confirmation_timeout_ms: u64,
    pub finality_delay_ms: u64,
    pub packages: PackageConfig,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl Default for RealtyConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        RealtyConfig {
            network: "testnet".to_owned(),
            confirmation_timeout_ms: duration_in_ms(ledger.confirmation_timeout),
            finality_delay_ms: duration_in_ms(ledger.finality_delay),
            packages: PackageConfig {
                counter: None,
                property: known_id(PROPERTY_PACKAGE),
                marketplace: known_id(MARKETPLACE_PACKAGE),
                escrow: known_id(ESCROW_PACKAGE),
                marketplace_object: known_id(MARKETPLACE_OBJECT),
            },
            listings: sample_listings(),
        }
    }
}

impl RealtyConfig {
    /// Reads and validates a configuration file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs_err::read_to_string(path)?;
        let config: RealtyConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration at `path`, or returns the built-in one.
    pub fn read_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read(path),
            None => Ok(Self::default()),
        }
    }

    /// Writes this configuration to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        fs_err::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("confirmation_timeout_ms"));
        }
        let mut seen = BTreeSet::new();
        for listing in &self.listings {
            if !seen.insert(listing.id) {
                return Err(ConfigError::DuplicateListing(listing.id));
            }
        }
        Ok(())
    }

    /// The timing policy of the in-memory ledger used by the demo.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            finality_delay: Duration::from_millis(self.finality_delay_ms),
            confirmation_timeout: Duration::from_millis(self.confirmation_timeout_ms),
        }
    }

    pub fn catalog(&self) -> ListingCatalog {
        ListingCatalog::new(self.listings.clone())
    }
}

fn duration_in_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn known_id(id: &str) -> ObjectId {
    id.parse().expect("Built-in object ids are valid")
}

fn sample_listings() -> Vec<Listing> {
    vec![
        Listing {
            id: known_id("0x123"),
            title: "Nhà 3 tầng view biển".to_owned(),
            description: "Nhà đẹp, vị trí thuận lợi, gần trung tâm, view biển tuyệt đẹp".to_owned(),
            location: "Đà Nẵng".to_owned(),
            price: 5_000_000,
            area: 120,
            property_type: PropertyType::House,
            image_url: PLACEHOLDER_IMAGE.to_owned(),
            is_available: true,
            owner: None,
        },
        Listing {
            id: known_id("0x456"),
            title: "Căn hộ cao cấp trung tâm".to_owned(),
            description: String::new(),
            location: "Hà Nội".to_owned(),
            price: 3_000_000,
            area: 80,
            property_type: PropertyType::Apartment,
            image_url: PLACEHOLDER_IMAGE.to_owned(),
            is_available: true,
            owner: None,
        },
    ]
}
