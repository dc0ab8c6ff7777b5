// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Submission of transactions and confirmation of their effects.
//!
//! A [`SubmissionCoordinator`] drives one user-visible surface (a counter, the property
//! registration form, ...). It moves through `Idle → Submitting → Confirming → Idle` for every
//! submission and refuses to start a new one while the previous one is pending.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use realty_base::{
    data_types::{ExecutionStatus, Transaction, TransactionEffects},
    identifiers::{AccountAddress, ObjectId, TransactionDigest},
};
use thiserror::Error;
use tracing::{debug, instrument, warn, Span};

#[cfg(feature = "metrics")]
use {
    once_cell::sync::Lazy,
    prometheus::{HistogramVec, IntCounterVec},
    realty_base::metrics::{self, MeasureLatency as _},
};

use crate::{
    client::{AccountProvider, ChainClient, ChainClientError, Signer, SignerError},
    read_state::{CounterState, ObjectState, ReadStateCache, ReadStateError},
    transaction::{CallIntent, IntentKind, TransactionBuilder},
};

#[cfg(test)]
#[path = "unit_tests/coordinator.rs"]
mod tests;

#[cfg(feature = "metrics")]
static CONFIRMATION_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    metrics::register_histogram_vec(
        "realty_confirmation_latency_ms",
        "Time between broadcast and observed finality",
        &["intent"],
        Some(vec![
            10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0,
            60_000.0,
        ]),
    )
    .expect("Histogram creation should not fail")
});

#[cfg(feature = "metrics")]
static SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    metrics::register_int_counter_vec(
        "realty_submissions",
        "Number of submissions by intent and outcome",
        &["intent", "outcome"],
    )
    .expect("Counter creation should not fail")
});

/// The phase of a [`SubmissionCoordinator`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubmissionState {
    /// No submission is pending.
    #[default]
    Idle,
    /// Waiting for the wallet to sign and broadcast, then for finality.
    Submitting(IntentKind),
    /// Finality observed; re-fetching the affected object.
    Confirming(IntentKind),
}

impl SubmissionState {
    /// Returns the label of the pending submission, if any.
    pub fn pending(&self) -> Option<IntentKind> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Submitting(kind) | SubmissionState::Confirming(kind) => Some(*kind),
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(formatter, "idle"),
            SubmissionState::Submitting(kind) => write!(formatter, "submitting {kind}"),
            SubmissionState::Confirming(kind) => write!(formatter, "confirming {kind}"),
        }
    }
}

/// Why a submission did not produce a [`Confirmation`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("A {pending} submission is still pending")]
    Busy { pending: IntentKind },

    #[error("No account is connected")]
    NoAccount,

    #[error("The user declined to sign the transaction: {0}")]
    SigningRejected(String),

    #[error("The transaction could not be broadcast: {0}")]
    BroadcastFailed(String),

    /// The transaction may still be executed; nothing is reconciled automatically.
    #[error("Timed out waiting for transaction {digest} to be finalized")]
    ConfirmationTimeout { digest: TransactionDigest },

    #[error("Transaction {digest} failed to execute: {error}")]
    ExecutionFailed {
        digest: TransactionDigest,
        error: String,
    },

    #[error("Transaction {digest} did not create any object")]
    MissingCreatedObject { digest: TransactionDigest },

    #[error("Failed to confirm transaction {digest}: {error}")]
    Client {
        digest: TransactionDigest,
        #[source]
        error: ChainClientError,
    },

    /// The transaction is final, but the affected object could not be read back.
    #[error("Transaction {digest} is final, but reading object {object_id} failed: {error}")]
    RefreshFailed {
        digest: TransactionDigest,
        object_id: ObjectId,
        #[source]
        error: ReadStateError,
    },
}

impl SubmissionError {
    /// A short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionError::Busy { .. } => "busy",
            SubmissionError::NoAccount => "no_account",
            SubmissionError::SigningRejected(_) => "signing_rejected",
            SubmissionError::BroadcastFailed(_) => "broadcast_failed",
            SubmissionError::ConfirmationTimeout { .. } => "confirmation_timeout",
            SubmissionError::ExecutionFailed { .. } => "execution_failed",
            SubmissionError::MissingCreatedObject { .. } => "missing_created_object",
            SubmissionError::Client { .. } => "client",
            SubmissionError::RefreshFailed { .. } => "refresh_failed",
        }
    }

    /// Returns the digest of the broadcast transaction, if the failure happened after the
    /// broadcast.
    pub fn digest(&self) -> Option<TransactionDigest> {
        match self {
            SubmissionError::ConfirmationTimeout { digest }
            | SubmissionError::ExecutionFailed { digest, .. }
            | SubmissionError::MissingCreatedObject { digest }
            | SubmissionError::Client { digest, .. }
            | SubmissionError::RefreshFailed { digest, .. } => Some(*digest),
            SubmissionError::Busy { .. }
            | SubmissionError::NoAccount
            | SubmissionError::SigningRejected(_)
            | SubmissionError::BroadcastFailed(_) => None,
        }
    }
}

impl From<SignerError> for SubmissionError {
    fn from(error: SignerError) -> Self {
        match error {
            SignerError::Rejected(reason) => SubmissionError::SigningRejected(reason),
            SignerError::Broadcast(reason) => SubmissionError::BroadcastFailed(reason),
        }
    }
}

/// A finalized submission.
#[derive(Clone, Debug)]
pub struct Confirmation<State> {
    pub kind: IntentKind,
    pub digest: TransactionDigest,
    pub effects: TransactionEffects,
    /// The object that was mutated or created.
    pub object_id: ObjectId,
    /// The state of [`Self::object_id`] re-fetched after finality.
    pub snapshot: State,
}

impl<State> Confirmation<State> {
    /// Returns the object created by the submission, if it was a creation.
    pub fn created_object(&self) -> Option<ObjectId> {
        (!self.kind.mutates_existing_object()).then_some(self.object_id)
    }
}

/// The result of [`SubmissionCoordinator::submit`].
pub type SubmissionOutcome<State> = Result<Confirmation<State>, SubmissionError>;

/// Serializes submissions for one surface and keeps its read state fresh.
pub struct SubmissionCoordinator<Client, State> {
    builder: TransactionBuilder,
    signer: Arc<dyn Signer>,
    accounts: Arc<dyn AccountProvider>,
    read_state: Arc<ReadStateCache<Client, State>>,
    object_id: Option<ObjectId>,
    state: Mutex<SubmissionState>,
}

impl<Client, State> SubmissionCoordinator<Client, State>
where
    Client: ChainClient,
    State: ObjectState,
{
    pub fn new(
        builder: TransactionBuilder,
        signer: Arc<dyn Signer>,
        accounts: Arc<dyn AccountProvider>,
        read_state: Arc<ReadStateCache<Client, State>>,
    ) -> Self {
        SubmissionCoordinator {
            builder,
            signer,
            accounts,
            read_state,
            object_id: None,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    /// Tracks the existing object that `Increment` and `Reset` intents act upon.
    pub fn with_object(mut self, object_id: ObjectId) -> Self {
        self.object_id = Some(object_id);
        self
    }

    /// Returns the tracked object, if any.
    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    pub fn read_state(&self) -> &Arc<ReadStateCache<Client, State>> {
        &self.read_state
    }

    pub fn state(&self) -> SubmissionState {
        *self.lock_state()
    }

    /// Returns the label of the pending submission, if any.
    pub fn pending_intent(&self) -> Option<IntentKind> {
        self.state().pending()
    }

    /// Returns the snapshot of the tracked object.
    ///
    /// # Panics
    ///
    /// If this coordinator doesn't track an object.
    pub async fn current_snapshot(&self) -> Result<State, ReadStateError> {
        let object_id = self
            .object_id
            .expect("`current_snapshot` requires a coordinator tracking an object");
        self.read_state.get(object_id).await
    }

    /// Returns the snapshot of any object, through the shared cache.
    pub async fn snapshot(&self, object_id: ObjectId) -> Result<State, ReadStateError> {
        self.read_state.get(object_id).await
    }

    /// Submits `intent`, waits for finality and re-fetches the affected object.
    ///
    /// Fails immediately, without contacting the signer, if another submission is pending.
    #[instrument(skip_all, fields(intent = %intent.kind(), object_id, digest))]
    pub async fn submit(&self, intent: CallIntent) -> SubmissionOutcome<State> {
        let kind = intent.kind();
        let outcome = match self.try_begin(kind) {
            Ok(pending) => self.run(intent, &pending).await,
            Err(error) => Err(error),
        };

        #[cfg(feature = "metrics")]
        SUBMISSIONS
            .with_label_values(&[
                kind.as_str(),
                outcome.as_ref().map_or_else(SubmissionError::label, |_| "confirmed"),
            ])
            .inc();

        match &outcome {
            Ok(confirmation) => debug!(digest = %confirmation.digest, "Submission confirmed"),
            Err(error) => warn!(%error, outcome = error.label(), "Submission failed"),
        }
        outcome
    }

    async fn run(
        &self,
        intent: CallIntent,
        pending: &PendingSubmission<'_>,
    ) -> SubmissionOutcome<State> {
        let kind = intent.kind();
        let sender = self.sender()?;

        let call = self.builder.build(&intent, self.object_id);
        debug!(call = %call.target(), %sender, "Requesting signature");
        let digest = self
            .signer
            .sign_and_execute(Transaction { sender, call })
            .await?;
        Span::current().record("digest", tracing::field::display(digest));

        let effects = self.wait_for_finality(kind, digest).await?;
        pending.advance(SubmissionState::Confirming(kind));

        let object_id = match self.object_id.filter(|_| kind.mutates_existing_object()) {
            Some(object_id) => object_id,
            None => effects
                .first_created()
                .ok_or(SubmissionError::MissingCreatedObject { digest })?,
        };
        Span::current().record("object_id", tracing::field::display(object_id));

        let snapshot = self
            .read_state
            .refresh(object_id)
            .await
            .map_err(|error| SubmissionError::RefreshFailed {
                digest,
                object_id,
                error,
            })?;

        Ok(Confirmation {
            kind,
            digest,
            effects,
            object_id,
            snapshot,
        })
    }

    async fn wait_for_finality(
        &self,
        kind: IntentKind,
        digest: TransactionDigest,
    ) -> Result<TransactionEffects, SubmissionError> {
        #[cfg(feature = "metrics")]
        let _latency = CONFIRMATION_LATENCY.measure_latency(&[kind.as_str()]);
        debug!(%kind, "Waiting for finality");

        let effects = self
            .read_state
            .client()
            .wait_for_finality(digest)
            .await
            .map_err(|error| match error {
                ChainClientError::Timeout { digest } => {
                    SubmissionError::ConfirmationTimeout { digest }
                }
                error => SubmissionError::Client { digest, error },
            })?;

        match &effects.status {
            ExecutionStatus::Success => Ok(effects),
            ExecutionStatus::Failure { error } => Err(SubmissionError::ExecutionFailed {
                digest,
                error: error.clone(),
            }),
        }
    }

    fn sender(&self) -> Result<AccountAddress, SubmissionError> {
        self.accounts
            .current_account()
            .ok_or(SubmissionError::NoAccount)
    }

    /// Moves from `Idle` to `Submitting`, or reports the submission that is still pending.
    fn try_begin(&self, kind: IntentKind) -> Result<PendingSubmission<'_>, SubmissionError> {
        let mut state = self.lock_state();
        if let Some(pending) = state.pending() {
            return Err(SubmissionError::Busy { pending });
        }
        *state = SubmissionState::Submitting(kind);
        Ok(PendingSubmission { state: &self.state })
    }

    fn lock_state(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Client> SubmissionCoordinator<Client, CounterState>
where
    Client: ChainClient,
{
    /// Returns [`true`] if the connected account owns the tracked counter, which is required
    /// to reset it.
    pub async fn can_reset(&self) -> Result<bool, ReadStateError> {
        let Some(account) = self.accounts.current_account() else {
            return Ok(false);
        };
        Ok(self.current_snapshot().await?.owner == account)
    }
}

/// The guard of a pending submission.
///
/// Returns the coordinator to [`SubmissionState::Idle`] when dropped, which covers success,
/// every failure, and callers that stop polling the submission.
struct PendingSubmission<'a> {
    state: &'a Mutex<SubmissionState>,
}

impl PendingSubmission<'_> {
    fn advance(&self, next: SubmissionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        self.advance(SubmissionState::Idle);
    }
}
