// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use realty_base::data_types::{CallArgument, PureValue};
use test_case::test_case;

use super::*;
use crate::{
    property::{PropertyDraft, PropertyType},
    test_utils::dummy_package,
};

fn counter_id() -> ObjectId {
    "0xabc".parse().unwrap()
}

#[test]
fn increment_passes_only_the_counter() {
    let builder = TransactionBuilder::new(dummy_package(1));
    let call = builder.build(&CallIntent::Increment, Some(counter_id()));

    assert_eq!(call.package, dummy_package(1));
    assert_eq!(call.module, COUNTER_MODULE);
    assert_eq!(call.function, "increment");
    assert_eq!(call.arguments, vec![CallArgument::Object(counter_id())]);
}

#[test]
fn reset_passes_the_counter_before_the_value() {
    let builder = TransactionBuilder::new(dummy_package(1));
    let call = builder.build(&CallIntent::Reset(0), Some(counter_id()));

    assert_eq!(call.function, "set_value");
    assert_eq!(
        call.arguments,
        vec![
            CallArgument::Object(counter_id()),
            CallArgument::Pure(PureValue::U64(0)),
        ]
    );
}

#[test_case(None; "without a tracked object")]
#[test_case(Some("0x1".parse().unwrap()); "ignoring the tracked object")]
fn create_has_no_arguments(object: Option<ObjectId>) {
    let builder = TransactionBuilder::new(dummy_package(1));
    let call = builder.build(&CallIntent::Create, object);

    assert_eq!(call.module, COUNTER_MODULE);
    assert_eq!(call.function, "create");
    assert!(call.arguments.is_empty());
}

#[test]
fn create_property_passes_the_form_fields_in_declared_order() {
    let draft = PropertyDraft {
        title: "Nhà 3 tầng view biển".to_owned(),
        description: "Gần trung tâm".to_owned(),
        location: "123 Trần Hưng Đạo, Đà Nẵng".to_owned(),
        price: 5_000_000,
        area: 120,
        property_type: PropertyType::Apartment,
        image_url: "https://example.com/image.jpg".to_owned(),
    };
    let builder = TransactionBuilder::new(dummy_package(2));
    let call = builder.build(&CallIntent::CreateProperty(draft.clone()), None);

    assert_eq!(call.module, PROPERTY_MODULE);
    assert_eq!(call.function, "create_property");
    let expected = [
        PureValue::String(draft.title),
        PureValue::String(draft.description),
        PureValue::String(draft.location),
        PureValue::U64(5_000_000),
        PureValue::U64(120),
        PureValue::U8(3),
        PureValue::String(draft.image_url),
    ]
    .into_iter()
    .map(CallArgument::Pure)
    .collect::<Vec<_>>();
    assert_eq!(call.arguments, expected);
}

#[test]
#[should_panic(expected = "`increment` requires the object it mutates")]
fn mutating_intents_need_an_object() {
    TransactionBuilder::new(dummy_package(1)).build(&CallIntent::Increment, None);
}

#[test]
fn intent_kinds_label_pending_submissions() {
    assert_eq!(CallIntent::Reset(7).kind().to_string(), "reset");
    assert!(IntentKind::Increment.mutates_existing_object());
    assert!(!IntentKind::CreateProperty.mutates_existing_object());
}
