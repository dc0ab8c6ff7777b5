// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module defines the client-side workflow of the Realty dApp: building calls from user
//! intents, submitting them through a wallet, waiting for finality and refreshing the
//! affected on-chain state.

pub mod client;
pub mod coordinator;
pub mod memory;
pub mod property;
pub mod read_state;
#[cfg(any(test, feature = "test"))]
pub mod test_utils;
pub mod transaction;

pub use crate::{
    client::{AccountProvider, ChainClient, ChainClientError, Signer, SignerError},
    coordinator::{
        Confirmation, SubmissionCoordinator, SubmissionError, SubmissionOutcome, SubmissionState,
    },
    read_state::{CounterState, ObjectState, ReadStateCache, ReadStateError},
    transaction::{CallIntent, IntentKind, TransactionBuilder},
};
