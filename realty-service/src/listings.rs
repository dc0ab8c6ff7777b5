// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering of listings and deployed packages.

use colored::Colorize as _;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use realty_core::{
    property::{Listing, ListingCatalog},
    transaction::{COUNTER_MODULE, PROPERTY_MODULE},
};

use crate::config::{RealtyConfig, ESCROW_MODULE, MARKETPLACE_MODULE};

#[cfg(test)]
#[path = "unit_tests/listings.rs"]
mod tests;

pub const EMPTY_CATALOG: &str = "Chưa có bất động sản nào";
pub const AVAILABLE_BADGE: &str = "Đang bán";
pub const SOLD_BADGE: &str = "Đã bán";

/// Formats a price with thousands separators, in IOTA.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted.push_str(" IOTA");
    formatted
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().copied());
    table
}

/// Renders one row per listing.
pub fn listings_table<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Table {
    let mut table = new_table(&["Id", "Loại", "Tiêu đề", "Địa chỉ", "Giá", "Diện tích", ""]);
    for listing in listings {
        let status = if listing.is_available {
            Cell::new(AVAILABLE_BADGE).fg(Color::Green)
        } else {
            Cell::new(SOLD_BADGE).fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(listing.id),
            Cell::new(listing.property_type),
            Cell::new(&listing.title),
            Cell::new(format!("📍 {}", listing.location)),
            Cell::new(format_price(listing.price)).fg(Color::Blue),
            Cell::new(format!("{}m²", listing.area)),
            status,
        ]);
    }
    table
}

/// Renders the catalogue, or the empty-catalogue notice.
pub fn render_catalog(catalog: &ListingCatalog, available_only: bool) -> String {
    let listings = if available_only {
        catalog.available().collect::<Vec<_>>()
    } else {
        catalog.all().iter().collect()
    };
    if listings.is_empty() {
        return EMPTY_CATALOG.to_owned();
    }
    listings_table(listings).to_string()
}

/// Renders the detail view of one listing.
pub fn listing_details(listing: &Listing) -> String {
    let badge = if listing.is_available {
        AVAILABLE_BADGE.green()
    } else {
        SOLD_BADGE.dimmed()
    };
    let mut lines = vec![
        format!("{}  [{badge}]", listing.title.bold()),
        format!(
            "{}   📐 {}m²   💰 {}",
            listing.property_type,
            listing.area,
            format_price(listing.price).blue().bold(),
        ),
        format!("Địa chỉ: 📍 {}", listing.location),
    ];
    if !listing.description.is_empty() {
        lines.push(format!("Mô tả: {}", listing.description));
    }
    if let Some(owner) = &listing.owner {
        lines.push(format!("Chủ sở hữu: {owner}"));
    }
    lines.push(format!("Ảnh: {}", listing.image_url));
    lines.push(format!("Id: {}", listing.id));
    lines.join("\n")
}

/// Renders the deployed packages and the modules they hold.
pub fn packages_table(config: &RealtyConfig) -> Table {
    let packages = &config.packages;
    let mut table = new_table(&["Module", "Object"]);
    table.add_row(vec![PROPERTY_MODULE.to_owned(), packages.property.to_string()]);
    table.add_row(vec![
        MARKETPLACE_MODULE.to_owned(),
        packages.marketplace.to_string(),
    ]);
    table.add_row(vec![ESCROW_MODULE.to_owned(), packages.escrow.to_string()]);
    table.add_row(vec![
        "marketplace (shared)".to_owned(),
        packages.marketplace_object.to_string(),
    ]);
    if let Some(counter) = packages.counter {
        table.add_row(vec![COUNTER_MODULE.to_owned(), counter.to_string()]);
    }
    table
}
