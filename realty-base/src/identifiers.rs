// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core identifiers used by the Realty dApp client.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

#[cfg(test)]
#[path = "unit_tests/identifiers.rs"]
mod tests;

/// The number of bytes in every identifier.
pub const IDENTIFIER_LENGTH: usize = 32;

/// An error when parsing an identifier from its textual form.
#[derive(Debug, Error, PartialEq)]
pub enum IdentifierParseError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier has {length} hex digits, but at most {max} are allowed")]
    TooLong { length: usize, max: usize },

    #[error("Identifier is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Parses up to 64 hex digits into 32 bytes, left-padding with zeros.
///
/// Chain explorers routinely abbreviate identifiers by dropping leading zeros, so `0xabc` is
/// accepted and means `0x000…0abc`.
fn parse_padded_hex(digits: &str) -> Result<[u8; IDENTIFIER_LENGTH], IdentifierParseError> {
    if digits.is_empty() {
        return Err(IdentifierParseError::Empty);
    }
    let max = IDENTIFIER_LENGTH * 2;
    if digits.len() > max {
        return Err(IdentifierParseError::TooLong {
            length: digits.len(),
            max,
        });
    }
    let padded = format!("{digits:0>max$}");
    let mut bytes = [0u8; IDENTIFIER_LENGTH];
    hex::decode_to_slice(padded, &mut bytes)?;
    Ok(bytes)
}

fn strip_hex_prefix(string: &str) -> &str {
    string
        .strip_prefix("0x")
        .or_else(|| string.strip_prefix("0X"))
        .unwrap_or(string)
}

/// Hashes the concatenation of `parts` with SHA3-256.
pub fn sha3_digest<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> [u8; IDENTIFIER_LENGTH] {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

macro_rules! address_like_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name([u8; IDENTIFIER_LENGTH]);

        impl $name {
            /// Wraps raw bytes.
            pub const fn new(bytes: [u8; IDENTIFIER_LENGTH]) -> Self {
                $name(bytes)
            }

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LENGTH] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}(0x{:.8}…)", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = IdentifierParseError;

            fn from_str(string: &str) -> Result<Self, Self::Err> {
                parse_padded_hex(strip_hex_prefix(string.trim())).map($name)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let string = String::deserialize(deserializer)?;
                string.parse().map_err(de::Error::custom)
            }
        }
    };
}

address_like_identifier! {
    /// The identifier of a unit of on-chain state, such as a counter or a property.
    ///
    /// Doubles as the address of a published package.
    ObjectId
}

address_like_identifier! {
    /// The address of an account that can own objects and sign transactions.
    AccountAddress
}

impl ObjectId {
    /// Derives the identifier of the `index`-th object created by the transaction with the
    /// given `digest`.
    pub fn derive(digest: &TransactionDigest, index: u64) -> Self {
        ObjectId(sha3_digest([
            digest.as_bytes().as_slice(),
            index.to_le_bytes().as_slice(),
        ]))
    }
}

/// The digest that identifies a transaction once it has been broadcast.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TransactionDigest([u8; IDENTIFIER_LENGTH]);

impl TransactionDigest {
    pub const fn new(bytes: [u8; IDENTIFIER_LENGTH]) -> Self {
        TransactionDigest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LENGTH] {
        &self.0
    }
}

impl fmt::Display for TransactionDigest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if formatter.alternate() {
            write!(formatter, "{:.8}", hex::encode(self.0))
        } else {
            write!(formatter, "{}", hex::encode(self.0))
        }
    }
}

impl fmt::Debug for TransactionDigest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "TransactionDigest({self:#})")
    }
}

impl FromStr for TransactionDigest {
    type Err = IdentifierParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; IDENTIFIER_LENGTH];
        hex::decode_to_slice(string.trim(), &mut bytes)?;
        Ok(TransactionDigest(bytes))
    }
}

impl Serialize for TransactionDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(de::Error::custom)
    }
}
