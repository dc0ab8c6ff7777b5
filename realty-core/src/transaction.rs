// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Translation of user intents into calls to on-chain entry points.

use std::fmt;

use realty_base::{
    data_types::{CallArgument, MoveCall, PureValue},
    identifiers::ObjectId,
};
use serde::{Deserialize, Serialize};

use crate::property::PropertyDraft;

#[cfg(test)]
#[path = "unit_tests/transaction.rs"]
mod tests;

/// The module implementing the counter demo.
pub const COUNTER_MODULE: &str = "counter";
/// The module implementing property registration.
pub const PROPERTY_MODULE: &str = "real_estate";

/// A user-initiated request to invoke one entry point.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CallIntent {
    /// Add one to an existing counter.
    Increment,
    /// Overwrite the value of an existing counter. Only its owner may do this.
    Reset(u64),
    /// Create a new counter owned by the sender.
    Create,
    /// Register a new property owned by the sender.
    CreateProperty(PropertyDraft),
}

/// The kind of a [`CallIntent`], without its arguments.
///
/// Used as the label of the submission that is currently pending.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum IntentKind {
    Increment,
    Reset,
    Create,
    CreateProperty,
}

impl CallIntent {
    pub fn kind(&self) -> IntentKind {
        match self {
            CallIntent::Increment => IntentKind::Increment,
            CallIntent::Reset(_) => IntentKind::Reset,
            CallIntent::Create => IntentKind::Create,
            CallIntent::CreateProperty(_) => IntentKind::CreateProperty,
        }
    }
}

impl IntentKind {
    /// Returns [`true`] if the call writes to an existing object rather than creating one.
    pub fn mutates_existing_object(&self) -> bool {
        matches!(self, IntentKind::Increment | IntentKind::Reset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Increment => "increment",
            IntentKind::Reset => "reset",
            IntentKind::Create => "create",
            IntentKind::CreateProperty => "create_property",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

/// Builds [`MoveCall`]s for the entry points published in one package.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransactionBuilder {
    package: ObjectId,
}

impl TransactionBuilder {
    pub fn new(package: ObjectId) -> Self {
        TransactionBuilder { package }
    }

    pub fn package(&self) -> ObjectId {
        self.package
    }

    /// Builds the call for `intent`.
    ///
    /// The object reference comes first for calls that mutate an existing object, followed by
    /// the literal arguments in declared order. Values are only tagged with their types: range
    /// checks are left to the ledger.
    ///
    /// # Panics
    ///
    /// If `intent` mutates an existing object and no `object` is provided.
    pub fn build(&self, intent: &CallIntent, object: Option<ObjectId>) -> MoveCall {
        let target_object = || {
            let object = object.unwrap_or_else(|| {
                panic!("`{}` requires the object it mutates", intent.kind())
            });
            CallArgument::Object(object)
        };

        let (module, function, arguments) = match intent {
            CallIntent::Increment => (COUNTER_MODULE, "increment", vec![target_object()]),
            CallIntent::Reset(value) => (
                COUNTER_MODULE,
                "set_value",
                vec![target_object(), CallArgument::Pure(PureValue::U64(*value))],
            ),
            CallIntent::Create => (COUNTER_MODULE, "create", vec![]),
            CallIntent::CreateProperty(draft) => {
                let arguments = [
                    PureValue::String(draft.title.clone()),
                    PureValue::String(draft.description.clone()),
                    PureValue::String(draft.location.clone()),
                    PureValue::U64(draft.price),
                    PureValue::U64(draft.area),
                    PureValue::U8(draft.property_type.code()),
                    PureValue::String(draft.image_url.clone()),
                ];
                (
                    PROPERTY_MODULE,
                    "create_property",
                    arguments.into_iter().map(CallArgument::Pure).collect(),
                )
            }
        };

        MoveCall {
            package: self.package,
            module: module.to_owned(),
            function: function.to_owned(),
            arguments,
        }
    }
}
