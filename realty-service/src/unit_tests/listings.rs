// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use realty_core::property::PropertyType;
use test_case::test_case;

use super::*;

#[test_case(0, "0 IOTA")]
#[test_case(999, "999 IOTA")]
#[test_case(1_000, "1,000 IOTA")]
#[test_case(5_000_000, "5,000,000 IOTA")]
#[test_case(12_345_678, "12,345,678 IOTA")]
fn prices_are_grouped_by_thousands(price: u64, expected: &str) {
    assert_eq!(format_price(price), expected);
}

fn listing(id: &str, is_available: bool) -> Listing {
    Listing {
        id: id.parse().unwrap(),
        title: format!("Nhà {id}"),
        description: String::new(),
        location: "Huế".to_owned(),
        price: 2_500_000,
        area: 95,
        property_type: PropertyType::House,
        image_url: String::new(),
        is_available,
        owner: None,
    }
}

#[test]
fn empty_catalogs_show_a_notice() {
    assert_eq!(render_catalog(&ListingCatalog::default(), false), EMPTY_CATALOG);

    let sold_out = ListingCatalog::new(vec![listing("0x1", false)]);
    assert_eq!(render_catalog(&sold_out, true), EMPTY_CATALOG);
    assert_ne!(render_catalog(&sold_out, false), EMPTY_CATALOG);
}

#[test]
fn catalogs_can_hide_sold_properties() {
    let catalog = ListingCatalog::new(vec![listing("0x1", true), listing("0x2", false)]);

    let everything = render_catalog(&catalog, false);
    assert!(everything.contains("Nhà 0x1"));
    assert!(everything.contains("Nhà 0x2"));
    assert!(everything.contains("2,500,000 IOTA"));
    assert!(everything.contains(SOLD_BADGE));

    let available = render_catalog(&catalog, true);
    assert!(available.contains("Nhà 0x1"));
    assert!(!available.contains("Nhà 0x2"));
}

#[test]
fn details_include_the_owner_when_known() {
    colored::control::set_override(false);
    let mut listing = listing("0x1", true);
    assert!(!listing_details(&listing).contains("Chủ sở hữu"));

    let owner: realty_base::identifiers::AccountAddress = "0xabc".parse().unwrap();
    listing.owner = Some(owner);
    let details = listing_details(&listing);

    assert!(details.starts_with("Nhà 0x1  [Đang bán]"));
    assert!(details.contains("🏠 Nhà"));
    assert!(details.contains("95m²"));
    assert!(details.contains(&owner.to_string()));
}

#[test]
fn package_tables_list_every_module() {
    let table = packages_table(&RealtyConfig::default()).to_string();

    for module in [PROPERTY_MODULE, MARKETPLACE_MODULE, ESCROW_MODULE] {
        assert!(table.contains(module));
    }
    assert!(!table.contains(COUNTER_MODULE));
}
