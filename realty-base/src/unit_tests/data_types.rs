// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use test_case::test_case;

use super::*;

#[derive(Debug, Deserialize)]
struct Fields {
    #[serde(deserialize_with = "deserialize_u64_lenient")]
    value: u64,
    #[serde(default, deserialize_with = "deserialize_u8_lenient")]
    kind: u8,
}

#[test_case(r#"{"value": 6}"#, 6; "number")]
#[test_case(r#"{"value": "6"}"#, 6; "string")]
#[test_case(r#"{"value": "18446744073709551615"}"#, u64::MAX; "max as string")]
fn lenient_u64_accepts_numbers_and_strings(json: &str, expected: u64) {
    let fields: Fields = serde_json::from_str(json).unwrap();
    assert_eq!(fields.value, expected);
}

#[test_case(r#"{"value": -1}"#; "negative")]
#[test_case(r#"{"value": "six"}"#; "not a number")]
#[test_case(r#"{"value": 1, "kind": 256}"#; "u8 overflow")]
fn lenient_integers_reject_invalid_input(json: &str) {
    assert!(serde_json::from_str::<Fields>(json).is_err());
}

#[test]
fn move_call_target_is_fully_qualified() {
    let call = MoveCall {
        package: "0x2".parse().unwrap(),
        module: "counter".to_owned(),
        function: "increment".to_owned(),
        arguments: vec![],
    };
    assert_eq!(
        call.target(),
        "0x0000000000000000000000000000000000000000000000000000000000000002::counter::increment"
    );
}

#[test]
fn struct_type_matching_ignores_the_package() {
    let object = ObjectData {
        object_id: "0xabc".parse().unwrap(),
        version: 1,
        owner: Owner::Shared,
        type_name: "0x2::counter::Counter".to_owned(),
        fields: serde_json::Map::new(),
    };
    assert!(object.is_struct("counter", "Counter"));
    assert!(!object.is_struct("real_estate", "Counter"));
    assert!(!object.is_struct("counter", "Property"));
}
