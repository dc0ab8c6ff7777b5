// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Test helpers to script the behavior of the wallet, the chain client and the connected
//! account.
//!
//! The [`ScriptedSigner`] wraps another [`Signer`] so that tests can make individual
//! submissions be rejected, fail to broadcast, or stay pending until released, without writing
//! a wallet for every scenario. The [`GatedClient`] does the same for object reads.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use async_trait::async_trait;
use realty_base::{
    data_types::{ObjectData, Transaction, TransactionEffects},
    identifiers::{AccountAddress, ObjectId, TransactionDigest, IDENTIFIER_LENGTH},
};
use tokio::sync::oneshot;

use crate::client::{AccountProvider, ChainClient, ChainClientError, Signer, SignerError};

/// What a [`ScriptedSigner`] does with the next transaction it receives.
pub enum SignerStep {
    /// Hand the transaction to the wrapped signer.
    Forward,
    /// Behave as if the user declined to sign.
    Reject(String),
    /// Behave as if the network refused the transaction.
    FailBroadcast(String),
    /// Wait until the sender side is used (or dropped), then forward.
    Hold(oneshot::Receiver<()>),
}

/// A [`Signer`] that follows a script before falling back to the wrapped signer.
pub struct ScriptedSigner<Inner> {
    inner: Inner,
    script: Mutex<VecDeque<SignerStep>>,
    calls: AtomicUsize,
}

impl<Inner> From<Inner> for ScriptedSigner<Inner> {
    fn from(inner: Inner) -> Self {
        ScriptedSigner {
            inner,
            script: Mutex::default(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<Inner> ScriptedSigner<Inner> {
    /// Appends a step to the script.
    pub fn then(&self, step: SignerStep) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
        self
    }

    /// Appends a [`SignerStep::Hold`], returning the handle that releases it.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.then(SignerStep::Hold(receiver));
        sender
    }

    /// Returns how many transactions were handed to this signer.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    fn next_step(&self) -> SignerStep {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(SignerStep::Forward)
    }
}

#[async_trait]
impl<Inner> Signer for ScriptedSigner<Inner>
where
    Inner: Signer,
{
    async fn sign_and_execute(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionDigest, SignerError> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        match self.next_step() {
            SignerStep::Forward => {}
            SignerStep::Reject(reason) => return Err(SignerError::Rejected(reason)),
            SignerStep::FailBroadcast(reason) => return Err(SignerError::Broadcast(reason)),
            SignerStep::Hold(release) => {
                let _ = release.await;
            }
        }
        self.inner.sign_and_execute(transaction).await
    }
}

/// A [`ChainClient`] whose object reads can be held back after they have read the ledger.
///
/// A held read returns the object as it was when the read started, which is how a slow node
/// answers with a version that is outdated by the time it arrives.
pub struct GatedClient<Inner> {
    inner: Inner,
    gates: Arc<Mutex<VecDeque<oneshot::Receiver<()>>>>,
}

impl<Inner> From<Inner> for GatedClient<Inner> {
    fn from(inner: Inner) -> Self {
        GatedClient {
            inner,
            gates: Arc::default(),
        }
    }
}

impl<Inner: Clone> Clone for GatedClient<Inner> {
    fn clone(&self) -> Self {
        GatedClient {
            inner: self.inner.clone(),
            gates: self.gates.clone(),
        }
    }
}

impl<Inner> GatedClient<Inner> {
    /// Holds the next object read until the returned sender is used (or dropped).
    pub fn hold_next_read(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(receiver);
        sender
    }

    fn next_gate(&self) -> Option<oneshot::Receiver<()>> {
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl<Inner> ChainClient for GatedClient<Inner>
where
    Inner: ChainClient,
{
    async fn wait_for_finality(
        &self,
        digest: TransactionDigest,
    ) -> Result<TransactionEffects, ChainClientError> {
        self.inner.wait_for_finality(digest).await
    }

    async fn get_object(
        &self,
        object_id: ObjectId,
    ) -> Result<Option<ObjectData>, ChainClientError> {
        let object = self.inner.get_object(object_id).await;
        if let Some(gate) = self.next_gate() {
            let _ = gate.await;
        }
        object
    }
}

/// An [`AccountProvider`] with a fixed answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticAccounts(pub Option<AccountAddress>);

impl AccountProvider for StaticAccounts {
    fn current_account(&self) -> Option<AccountAddress> {
        self.0
    }
}

/// Creates a dummy [`AccountAddress`] by repeating the provided byte.
pub fn dummy_account(byte: u8) -> AccountAddress {
    AccountAddress::new([byte; IDENTIFIER_LENGTH])
}

/// Creates a dummy package [`ObjectId`] by repeating the provided byte.
pub fn dummy_package(byte: u8) -> ObjectId {
    ObjectId::new([byte; IDENTIFIER_LENGTH])
}
