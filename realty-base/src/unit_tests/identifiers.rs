// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use test_case::test_case;

use super::*;

#[test_case("0xabc"; "short with prefix")]
#[test_case("abc"; "short without prefix")]
#[test_case("0XABC"; "uppercase")]
#[test_case("0x0000000000000000000000000000000000000000000000000000000000000abc"; "full length")]
fn short_object_ids_are_left_padded(input: &str) {
    let id: ObjectId = input.parse().unwrap();
    let mut expected = [0u8; IDENTIFIER_LENGTH];
    expected[30] = 0x0a;
    expected[31] = 0xbc;
    assert_eq!(id.as_bytes(), &expected);
}

#[test]
fn object_id_display_is_full_length_prefixed_hex() {
    let id: ObjectId = "0x1".parse().unwrap();
    assert_eq!(
        id.to_string(),
        "0x0000000000000000000000000000000000000000000000000000000000000001"
    );
    assert_eq!(id.to_string().parse::<ObjectId>().unwrap(), id);
}

#[test]
fn invalid_identifiers_are_rejected() {
    assert_eq!("0x".parse::<AccountAddress>(), Err(IdentifierParseError::Empty));
    assert_matches!(
        "0xzz".parse::<AccountAddress>(),
        Err(IdentifierParseError::InvalidHex(_))
    );
    let too_long = format!("0x{}", "1".repeat(65));
    assert_eq!(
        too_long.parse::<ObjectId>(),
        Err(IdentifierParseError::TooLong {
            length: 65,
            max: 64
        })
    );
}

#[test]
fn hex_errors_keep_their_cause() {
    let error = "0x1g".parse::<ObjectId>().unwrap_err();
    assert_eq!(
        error,
        IdentifierParseError::InvalidHex(hex::FromHexError::InvalidHexCharacter {
            c: 'g',
            index: 63
        })
    );
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn identifiers_serialize_as_strings() {
    let address: AccountAddress = "0xdead".parse().unwrap();
    let json = serde_json::to_string(&address).unwrap();
    assert_eq!(json, format!("\"{address}\""));
    assert_eq!(
        serde_json::from_str::<AccountAddress>(&json).unwrap(),
        address
    );
}

#[test]
fn transaction_digests_require_all_digits() {
    let digest = TransactionDigest::new([7; IDENTIFIER_LENGTH]);
    assert_eq!(digest.to_string().parse::<TransactionDigest>(), Ok(digest));
    assert_eq!(format!("{digest:#}"), "07070707");
    assert_matches!(
        "abc".parse::<TransactionDigest>(),
        Err(IdentifierParseError::InvalidHex(_))
    );
}

#[test]
fn derived_object_ids_depend_on_digest_and_index() {
    let first = TransactionDigest::new([1; IDENTIFIER_LENGTH]);
    let second = TransactionDigest::new([2; IDENTIFIER_LENGTH]);

    assert_eq!(ObjectId::derive(&first, 0), ObjectId::derive(&first, 0));
    assert_ne!(ObjectId::derive(&first, 0), ObjectId::derive(&first, 1));
    assert_ne!(ObjectId::derive(&first, 0), ObjectId::derive(&second, 0));
}
