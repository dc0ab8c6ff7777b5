// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core data-types used in transactions, effects and on-chain objects.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::identifiers::{AccountAddress, ObjectId, TransactionDigest};

#[cfg(test)]
#[path = "unit_tests/data_types.rs"]
mod tests;

/// A literal argument passed by value to an entry point.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PureValue {
    U8(u8),
    U64(u64),
    String(String),
}

/// An argument of a [`MoveCall`].
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CallArgument {
    /// A reference to an existing on-chain object.
    Object(ObjectId),
    /// A literal value.
    Pure(PureValue),
}

/// A description of a call to an on-chain entry point.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MoveCall {
    /// The package where the module is published.
    pub package: ObjectId,
    /// The module inside the package.
    pub module: String,
    /// The entry function inside the module.
    pub function: String,
    /// The arguments, in the order the entry point declares them.
    pub arguments: Vec<CallArgument>,
}

impl MoveCall {
    /// Returns the fully qualified `package::module::function` target.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// A call ready to be signed by `sender`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Transaction {
    pub sender: AccountAddress,
    pub call: MoveCall,
}

/// Whether a finalized transaction executed successfully.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// The effects reported by the ledger for a finalized transaction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransactionEffects {
    pub digest: TransactionDigest,
    pub status: ExecutionStatus,
    /// Objects created by the transaction, in creation order.
    pub created: Vec<ObjectId>,
    /// Pre-existing objects written by the transaction.
    pub mutated: Vec<ObjectId>,
}

impl TransactionEffects {
    /// Returns the first object created by the transaction, if any.
    pub fn first_created(&self) -> Option<ObjectId> {
        self.created.first().copied()
    }
}

/// Who is allowed to use an object in a transaction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Owner {
    AddressOwner(AccountAddress),
    Shared,
    Immutable,
}

/// A raw snapshot of an on-chain object, as returned by a chain client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ObjectData {
    pub object_id: ObjectId,
    pub version: u64,
    pub owner: Owner,
    /// The fully qualified type, e.g. `0x…::counter::Counter`.
    pub type_name: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ObjectData {
    /// Returns [`true`] if this object's type is `module::name` inside any package.
    pub fn is_struct(&self, module: &str, name: &str) -> bool {
        self.type_name
            .rsplit("::")
            .take(2)
            .eq([name, module].into_iter())
    }
}

/// Deserializes a `u64` that may be encoded either as a JSON number or as a decimal string.
///
/// Ledger JSON encodings render 64-bit integers as strings to stay within the range of
/// JavaScript numbers.
pub fn deserialize_u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientU64;

    impl de::Visitor<'_> for LenientU64 {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an unsigned 64-bit integer or its decimal string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
            u64::try_from(value).map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
            value
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(LenientU64)
}

/// Deserializes a `u8` with the same leniency as [`deserialize_u64_lenient`].
pub fn deserialize_u8_lenient<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_u64_lenient(deserializer)?;
    u8::try_from(value).map_err(|_| {
        de::Error::invalid_value(de::Unexpected::Unsigned(value), &"an unsigned 8-bit integer")
    })
}
