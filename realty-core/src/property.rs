// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Real-estate properties: the registration form, the on-chain state and the listings shown
//! to buyers.

use std::fmt;

use realty_base::{
    data_types::{deserialize_u64_lenient, deserialize_u8_lenient},
    identifiers::{AccountAddress, ObjectId},
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{read_state::ObjectState, transaction::PROPERTY_MODULE};

#[cfg(test)]
#[path = "unit_tests/property.rs"]
mod tests;

/// The kind of a property, encoded on chain as a `u8`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PropertyType {
    House,
    Land,
    Apartment,
}

/// An unknown [`PropertyType`] code.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("Unknown property type code {0}")]
pub struct UnknownPropertyType(pub u8);

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Apartment,
    ];

    /// The code used by the `real_estate` module.
    pub fn code(&self) -> u8 {
        match self {
            PropertyType::House => 1,
            PropertyType::Land => 2,
            PropertyType::Apartment => 3,
        }
    }

    /// The label shown in listings.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::House => "Nhà",
            PropertyType::Land => "Đất",
            PropertyType::Apartment => "Căn hộ",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PropertyType::House => "🏠",
            PropertyType::Land => "🌳",
            PropertyType::Apartment => "🏢",
        }
    }
}

impl TryFrom<u8> for PropertyType {
    type Error = UnknownPropertyType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        PropertyType::ALL
            .into_iter()
            .find(|property_type| property_type.code() == code)
            .ok_or(UnknownPropertyType(code))
    }
}

impl From<PropertyType> for u8 {
    fn from(property_type: PropertyType) -> Self {
        property_type.code()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.icon(), self.label())
    }
}

/// Why a [`PropertyDraft`] can't be submitted yet.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum PropertyDraftError {
    #[error("A property needs a title")]
    MissingTitle,

    #[error("A property needs a non-zero price")]
    ZeroPrice,

    #[error("A property needs a non-zero area")]
    ZeroArea,
}

/// The fields filled in to register a property.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    /// The asking price, in the smallest unit of the native token.
    pub price: u64,
    /// The area, in square meters.
    pub area: u64,
    pub property_type: PropertyType,
    pub image_url: String,
}

impl PropertyDraft {
    /// Checks that the fields required to register a property are filled in.
    pub fn validate(&self) -> Result<(), PropertyDraftError> {
        if self.title.trim().is_empty() {
            return Err(PropertyDraftError::MissingTitle);
        }
        if self.price == 0 {
            return Err(PropertyDraftError::ZeroPrice);
        }
        if self.area == 0 {
            return Err(PropertyDraftError::ZeroArea);
        }
        Ok(())
    }
}

/// A registered property, as stored on chain.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertyState {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(deserialize_with = "deserialize_u64_lenient")]
    pub price: u64,
    #[serde(deserialize_with = "deserialize_u64_lenient")]
    pub area: u64,
    #[serde(deserialize_with = "deserialize_property_type")]
    pub property_type: PropertyType,
    pub image_url: String,
    pub is_available: bool,
    pub owner: AccountAddress,
}

impl ObjectState for PropertyState {
    const MODULE: &'static str = PROPERTY_MODULE;
    const STRUCT: &'static str = "Property";
}

fn deserialize_property_type<'de, D>(deserializer: D) -> Result<PropertyType, D::Error>
where
    D: Deserializer<'de>,
{
    let code = deserialize_u8_lenient(deserializer)?;
    PropertyType::try_from(code).map_err(serde::de::Error::custom)
}

/// A property offered for sale, as shown in the listing catalogue.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Listing {
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub price: u64,
    pub area: u64,
    pub property_type: PropertyType,
    pub image_url: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountAddress>,
}

impl Listing {
    /// Builds the listing of a property read from the chain.
    pub fn from_state(id: ObjectId, state: PropertyState) -> Self {
        Listing {
            id,
            title: state.title,
            description: state.description,
            location: state.location,
            price: state.price,
            area: state.area,
            property_type: state.property_type,
            image_url: state.image_url,
            is_available: state.is_available,
            owner: Some(state.owner),
        }
    }
}

/// The set of listings offered to buyers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListingCatalog {
    listings: Vec<Listing>,
}

impl ListingCatalog {
    pub fn new(listings: Vec<Listing>) -> Self {
        ListingCatalog { listings }
    }

    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &ObjectId) -> Option<&Listing> {
        self.listings.iter().find(|listing| &listing.id == id)
    }

    /// Returns the listings that are still for sale.
    pub fn available(&self) -> impl Iterator<Item = &Listing> {
        self.listings.iter().filter(|listing| listing.is_available)
    }

    /// Adds or replaces the listing with the same id.
    pub fn upsert(&mut self, listing: Listing) {
        match self.listings.iter_mut().find(|existing| existing.id == listing.id) {
            Some(existing) => *existing = listing,
            None => self.listings.push(listing),
        }
    }
}
