// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use realty_base::data_types::{ObjectData, Owner};
use serde_json::json;
use test_case::test_case;

use super::*;
use crate::read_state::ReadStateError;

fn draft() -> PropertyDraft {
    PropertyDraft {
        title: "Căn hộ cao cấp trung tâm".to_owned(),
        description: String::new(),
        location: "Hà Nội".to_owned(),
        price: 3_000_000,
        area: 80,
        property_type: PropertyType::Apartment,
        image_url: String::new(),
    }
}

#[test_case(1, PropertyType::House; "house")]
#[test_case(2, PropertyType::Land; "land")]
#[test_case(3, PropertyType::Apartment; "apartment")]
fn property_type_codes_round_trip(code: u8, property_type: PropertyType) {
    assert_eq!(PropertyType::try_from(code), Ok(property_type));
    assert_eq!(property_type.code(), code);
}

#[test]
fn unknown_property_type_codes_are_rejected() {
    assert_eq!(PropertyType::try_from(0), Err(UnknownPropertyType(0)));
    assert!(serde_json::from_value::<PropertyType>(json!(4)).is_err());
}

#[test]
fn complete_drafts_are_valid() {
    assert_eq!(draft().validate(), Ok(()));
}

#[test_case(|draft: &mut PropertyDraft| draft.title = "   ".to_owned(), PropertyDraftError::MissingTitle; "blank title")]
#[test_case(|draft: &mut PropertyDraft| draft.price = 0, PropertyDraftError::ZeroPrice; "zero price")]
#[test_case(|draft: &mut PropertyDraft| draft.area = 0, PropertyDraftError::ZeroArea; "zero area")]
fn incomplete_drafts_are_rejected(edit: fn(&mut PropertyDraft), expected: PropertyDraftError) {
    let mut draft = draft();
    edit(&mut draft);
    assert_eq!(draft.validate(), Err(expected));
}

fn property_object(fields: serde_json::Value) -> ObjectData {
    let serde_json::Value::Object(fields) = fields else {
        panic!("Fields must be a JSON object");
    };
    ObjectData {
        object_id: "0x123".parse().unwrap(),
        version: 1,
        owner: Owner::Shared,
        type_name: "0x2ee8::real_estate::Property".to_owned(),
        fields,
    }
}

#[test]
fn property_state_decodes_ledger_json() {
    let owner = "0xabc".parse::<AccountAddress>().unwrap();
    let object = property_object(json!({
        "title": "Nhà 3 tầng view biển",
        "description": "",
        "location": "Đà Nẵng",
        "price": "5000000",
        "area": 120,
        "property_type": "1",
        "image_url": "",
        "is_available": true,
        "owner": owner.to_string(),
    }));

    let state = PropertyState::decode(&object).unwrap();
    assert_eq!(state.price, 5_000_000);
    assert_eq!(state.area, 120);
    assert_eq!(state.property_type, PropertyType::House);
    assert_eq!(state.owner, owner);

    let listing = Listing::from_state(object.object_id, state);
    assert_eq!(listing.owner, Some(owner));
    assert!(listing.is_available);
}

#[test]
fn property_state_rejects_unknown_types() {
    let object = property_object(json!({
        "title": "", "description": "", "location": "", "price": 1, "area": 1,
        "property_type": 9, "image_url": "", "is_available": false,
        "owner": "0x1",
    }));
    assert_matches!(
        PropertyState::decode(&object),
        Err(ReadStateError::InvalidContent { .. })
    );
}

fn listing(id: &str, is_available: bool) -> Listing {
    Listing {
        id: id.parse().unwrap(),
        title: format!("Listing {id}"),
        description: String::new(),
        location: "Đà Nẵng".to_owned(),
        price: 1,
        area: 1,
        property_type: PropertyType::Land,
        image_url: String::new(),
        is_available,
        owner: None,
    }
}

#[test]
fn catalog_lookups_and_upserts() {
    let mut catalog = ListingCatalog::new(vec![listing("0x123", true), listing("0x456", false)]);

    assert_eq!(catalog.available().count(), 1);
    assert_eq!(
        catalog.get(&"0x456".parse().unwrap()).map(|l| l.is_available),
        Some(false)
    );
    assert!(catalog.get(&"0x789".parse().unwrap()).is_none());

    catalog.upsert(listing("0x456", true));
    catalog.upsert(listing("0x789", true));
    assert_eq!(catalog.all().len(), 3);
    assert_eq!(catalog.available().count(), 3);
}
