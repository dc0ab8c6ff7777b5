// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides the base definitions shared by the Realty client crates: identifiers
//! of objects, accounts and transactions, and the data types exchanged with a ledger.

pub mod data_types;
pub mod identifiers;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod tracing;
