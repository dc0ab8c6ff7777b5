// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Interfaces of the collaborators the client relies on: a wallet that signs and broadcasts
//! transactions, a chain client that reports finality and object state, and the source of the
//! currently connected account.

use async_trait::async_trait;
use realty_base::{
    data_types::{ObjectData, Transaction, TransactionEffects},
    identifiers::{AccountAddress, ObjectId, TransactionDigest},
};
use thiserror::Error;

/// A failure to get a transaction signed and broadcast.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SignerError {
    /// The user declined to sign.
    #[error("Signing was rejected: {0}")]
    Rejected(String),

    /// The signed transaction could not be handed to the network.
    #[error("Broadcast failed: {0}")]
    Broadcast(String),
}

/// A failure reported by the chain client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ChainClientError {
    /// Finality was not observed within the client's own deadline.
    #[error("Timed out waiting for transaction {digest} to be finalized")]
    Timeout { digest: TransactionDigest },

    /// The ledger has never seen the transaction.
    #[error("Unknown transaction {digest}")]
    UnknownTransaction { digest: TransactionDigest },

    /// The node could not be reached or answered with an error.
    #[error("Chain client request failed: {0}")]
    Rpc(String),
}

/// A wallet capable of signing a [`Transaction`] and broadcasting it to the network.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Requests a signature for `transaction` and broadcasts it, returning its digest once
    /// the network has accepted it.
    async fn sign_and_execute(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionDigest, SignerError>;
}

/// Read access to the ledger.
#[async_trait]
pub trait ChainClient: Clone + Send + Sync + 'static {
    /// Waits until the transaction with `digest` is final, returning its effects.
    ///
    /// Any deadline is the client's own policy.
    async fn wait_for_finality(
        &self,
        digest: TransactionDigest,
    ) -> Result<TransactionEffects, ChainClientError>;

    /// Reads the latest version of an object, or [`None`] if it doesn't exist (or isn't
    /// indexed yet).
    async fn get_object(
        &self,
        object_id: ObjectId,
    ) -> Result<Option<ObjectData>, ChainClientError>;
}

/// The source of the account currently connected to the client.
pub trait AccountProvider: Send + Sync {
    /// Returns the connected account, if any.
    fn current_account(&self) -> Option<AccountAddress>;
}
