// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An in-process ledger implementing every collaborator of the client.
//!
//! Transactions are accepted immediately and become final `finality_delay` later. Finality is
//! driven by the clock: any read observes every transaction whose finality instant has passed,
//! executed in acceptance order.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use realty_base::{
    data_types::{
        CallArgument, ExecutionStatus, MoveCall, ObjectData, Owner, PureValue, Transaction,
        TransactionEffects,
    },
    identifiers::{sha3_digest, AccountAddress, ObjectId, TransactionDigest},
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::{
    client::{AccountProvider, ChainClient, ChainClientError, Signer, SignerError},
    transaction::{COUNTER_MODULE, PROPERTY_MODULE},
};

#[cfg(test)]
#[path = "unit_tests/memory.rs"]
mod tests;

/// Timing policy of a [`MemoryLedger`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    /// Time between acceptance of a transaction and its finality.
    pub finality_delay: Duration,
    /// How long [`ChainClient::wait_for_finality`] waits before giving up.
    pub confirmation_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            finality_delay: Duration::from_millis(10),
            confirmation_timeout: Duration::from_secs(30),
        }
    }
}

/// Why a call aborted during execution.
#[derive(Debug, Error)]
enum MoveAbort {
    #[error("function {0} does not exist")]
    UnknownFunction(String),

    #[error("expected {expected} arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("argument {position} has the wrong type")]
    ArgumentType { position: usize },

    #[error("object {0} does not exist")]
    ObjectNotFound(ObjectId),

    #[error("object {0} is not a counter")]
    NotACounter(ObjectId),

    #[error("only the owner of counter {0} may set its value")]
    NotOwner(ObjectId),

    #[error("arithmetic overflow incrementing counter {0}")]
    Overflow(ObjectId),
}

struct PendingTransaction {
    digest: TransactionDigest,
    transaction: Transaction,
    final_at: Instant,
}

#[derive(Default)]
struct LedgerState {
    objects: BTreeMap<ObjectId, ObjectData>,
    pending: VecDeque<PendingTransaction>,
    /// Effects of every finalized transaction. Never pruned: it grows for as long as the
    /// ledger lives.
    effects: HashMap<TransactionDigest, TransactionEffects>,
    next_sequence_number: u64,
}

struct LedgerInner {
    config: LedgerConfig,
    state: Mutex<LedgerState>,
    account: RwLock<Option<AccountAddress>>,
}

/// A ledger held in memory.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct MemoryLedger {
    inner: Arc<LedgerInner>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        MemoryLedger::new(LedgerConfig::default())
    }
}

impl MemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        MemoryLedger {
            inner: Arc::new(LedgerInner {
                config,
                state: Mutex::default(),
                account: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> LedgerConfig {
        self.inner.config
    }

    /// Connects `account` as the wallet's active account.
    pub fn connect(&self, account: AccountAddress) {
        *self.inner.account.write().unwrap_or_else(PoisonError::into_inner) = Some(account);
    }

    pub fn disconnect(&self) {
        *self.inner.account.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Stores a counter object with the given contents, replacing any existing object with a
    /// newer version.
    pub fn insert_counter(
        &self,
        package: ObjectId,
        object_id: ObjectId,
        value: u64,
        owner: AccountAddress,
    ) {
        let mut state = self.lock_state();
        let version = state
            .objects
            .get(&object_id)
            .map_or(1, |existing| existing.version + 1);
        let object = counter_object(package, object_id, version, value, owner);
        state.objects.insert(object_id, object);
    }

    /// Returns the number of transactions accepted but not yet final.
    pub fn pending_transactions(&self) -> usize {
        let mut state = self.lock_state();
        state.finalize_due(Instant::now());
        state.pending.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Signer for MemoryLedger {
    async fn sign_and_execute(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionDigest, SignerError> {
        if self.current_account() != Some(transaction.sender) {
            return Err(SignerError::Rejected(format!(
                "the wallet cannot sign for {}",
                transaction.sender
            )));
        }
        let bytes = bcs::to_bytes(&transaction)
            .map_err(|error| SignerError::Broadcast(error.to_string()))?;

        let mut state = self.lock_state();
        let sequence_number = state.next_sequence_number;
        state.next_sequence_number += 1;
        let digest = TransactionDigest::new(sha3_digest([
            bytes.as_slice(),
            sequence_number.to_le_bytes().as_slice(),
        ]));
        debug!(%digest, call = %transaction.call.target(), "Accepted transaction");
        state.pending.push_back(PendingTransaction {
            digest,
            transaction,
            final_at: Instant::now() + self.inner.config.finality_delay,
        });
        Ok(digest)
    }
}

#[async_trait]
impl ChainClient for MemoryLedger {
    async fn wait_for_finality(
        &self,
        digest: TransactionDigest,
    ) -> Result<TransactionEffects, ChainClientError> {
        let deadline = Instant::now() + self.inner.config.confirmation_timeout;
        let final_at = {
            let mut state = self.lock_state();
            state.finalize_due(Instant::now());
            if let Some(effects) = state.effects.get(&digest) {
                return Ok(effects.clone());
            }
            state
                .pending
                .iter()
                .find(|pending| pending.digest == digest)
                .map(|pending| pending.final_at)
                .ok_or(ChainClientError::UnknownTransaction { digest })?
        };

        if final_at > deadline {
            sleep_until(deadline).await;
            return Err(ChainClientError::Timeout { digest });
        }
        sleep_until(final_at).await;

        let mut state = self.lock_state();
        state.finalize_due(Instant::now());
        state
            .effects
            .get(&digest)
            .cloned()
            .ok_or(ChainClientError::UnknownTransaction { digest })
    }

    async fn get_object(
        &self,
        object_id: ObjectId,
    ) -> Result<Option<ObjectData>, ChainClientError> {
        let mut state = self.lock_state();
        state.finalize_due(Instant::now());
        Ok(state.objects.get(&object_id).cloned())
    }
}

impl AccountProvider for MemoryLedger {
    fn current_account(&self) -> Option<AccountAddress> {
        *self.inner.account.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerState {
    /// Executes, in order, every pending transaction that is final at `now`.
    fn finalize_due(&mut self, now: Instant) {
        while self
            .pending
            .front()
            .is_some_and(|pending| pending.final_at <= now)
        {
            let Some(PendingTransaction {
                digest,
                transaction,
                ..
            }) = self.pending.pop_front()
            else {
                break;
            };
            let effects = self.execute(digest, transaction);
            trace!(%digest, status = ?effects.status, "Finalized transaction");
            self.effects.insert(digest, effects);
        }
    }

    fn execute(
        &mut self,
        digest: TransactionDigest,
        transaction: Transaction,
    ) -> TransactionEffects {
        let mut effects = TransactionEffects {
            digest,
            status: ExecutionStatus::Success,
            created: vec![],
            mutated: vec![],
        };
        let result = match transaction.call.module.as_str() {
            COUNTER_MODULE => self.execute_counter(&digest, &transaction, &mut effects),
            PROPERTY_MODULE => self.execute_property(&digest, &transaction, &mut effects),
            _ => Err(MoveAbort::UnknownFunction(transaction.call.target())),
        };
        if let Err(abort) = result {
            effects.status = ExecutionStatus::Failure {
                error: abort.to_string(),
            };
            effects.created.clear();
            effects.mutated.clear();
        }
        effects
    }

    fn execute_counter(
        &mut self,
        digest: &TransactionDigest,
        transaction: &Transaction,
        effects: &mut TransactionEffects,
    ) -> Result<(), MoveAbort> {
        let call = &transaction.call;
        match call.function.as_str() {
            "create" => {
                expect_arguments(call, 0)?;
                let object_id = ObjectId::derive(digest, 0);
                let object = counter_object(call.package, object_id, 1, 0, transaction.sender);
                self.objects.insert(object_id, object);
                effects.created.push(object_id);
            }
            "increment" => {
                expect_arguments(call, 1)?;
                let object_id = object_argument(call, 0)?;
                let (value, _) = self.counter_fields(object_id)?;
                let value = value.checked_add(1).ok_or(MoveAbort::Overflow(object_id))?;
                self.write_counter_value(object_id, value);
                effects.mutated.push(object_id);
            }
            "set_value" => {
                expect_arguments(call, 2)?;
                let object_id = object_argument(call, 0)?;
                let value = u64_argument(call, 1)?;
                let (_, owner) = self.counter_fields(object_id)?;
                if owner != transaction.sender {
                    return Err(MoveAbort::NotOwner(object_id));
                }
                self.write_counter_value(object_id, value);
                effects.mutated.push(object_id);
            }
            _ => return Err(MoveAbort::UnknownFunction(call.target())),
        }
        Ok(())
    }

    fn execute_property(
        &mut self,
        digest: &TransactionDigest,
        transaction: &Transaction,
        effects: &mut TransactionEffects,
    ) -> Result<(), MoveAbort> {
        let call = &transaction.call;
        if call.function != "create_property" {
            return Err(MoveAbort::UnknownFunction(call.target()));
        }
        expect_arguments(call, 7)?;

        let mut fields = Map::new();
        fields.insert("title".into(), json!(string_argument(call, 0)?));
        fields.insert("description".into(), json!(string_argument(call, 1)?));
        fields.insert("location".into(), json!(string_argument(call, 2)?));
        fields.insert("price".into(), json!(u64_argument(call, 3)?.to_string()));
        fields.insert("area".into(), json!(u64_argument(call, 4)?.to_string()));
        fields.insert("property_type".into(), json!(u8_argument(call, 5)?));
        fields.insert("image_url".into(), json!(string_argument(call, 6)?));
        fields.insert("is_available".into(), json!(true));
        fields.insert("owner".into(), json!(transaction.sender.to_string()));

        let object_id = ObjectId::derive(digest, 0);
        self.objects.insert(
            object_id,
            ObjectData {
                object_id,
                version: 1,
                owner: Owner::AddressOwner(transaction.sender),
                type_name: format!("{}::{PROPERTY_MODULE}::Property", call.package),
                fields,
            },
        );
        effects.created.push(object_id);
        Ok(())
    }

    fn counter_fields(&self, object_id: ObjectId) -> Result<(u64, AccountAddress), MoveAbort> {
        let object = self
            .objects
            .get(&object_id)
            .ok_or(MoveAbort::ObjectNotFound(object_id))?;
        if !object.is_struct(COUNTER_MODULE, "Counter") {
            return Err(MoveAbort::NotACounter(object_id));
        }
        let value = object
            .fields
            .get("value")
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok());
        let owner = object
            .fields
            .get("owner")
            .and_then(Value::as_str)
            .and_then(|owner| owner.parse().ok());
        value.zip(owner).ok_or(MoveAbort::NotACounter(object_id))
    }

    fn write_counter_value(&mut self, object_id: ObjectId, value: u64) {
        if let Some(object) = self.objects.get_mut(&object_id) {
            object
                .fields
                .insert("value".into(), json!(value.to_string()));
            object.version += 1;
        }
    }
}

/// Builds a counter object, encoding the value as a decimal string like ledger JSON does.
fn counter_object(
    package: ObjectId,
    object_id: ObjectId,
    version: u64,
    value: u64,
    owner: AccountAddress,
) -> ObjectData {
    let mut fields = Map::new();
    fields.insert("value".into(), json!(value.to_string()));
    fields.insert("owner".into(), json!(owner.to_string()));
    ObjectData {
        object_id,
        version,
        owner: Owner::Shared,
        type_name: format!("{package}::{COUNTER_MODULE}::Counter"),
        fields,
    }
}

fn expect_arguments(call: &MoveCall, expected: usize) -> Result<(), MoveAbort> {
    if call.arguments.len() == expected {
        Ok(())
    } else {
        Err(MoveAbort::ArgumentCount {
            expected,
            found: call.arguments.len(),
        })
    }
}

fn object_argument(call: &MoveCall, position: usize) -> Result<ObjectId, MoveAbort> {
    match call.arguments.get(position) {
        Some(CallArgument::Object(object_id)) => Ok(*object_id),
        _ => Err(MoveAbort::ArgumentType { position }),
    }
}

fn pure_argument(call: &MoveCall, position: usize) -> Result<&PureValue, MoveAbort> {
    match call.arguments.get(position) {
        Some(CallArgument::Pure(value)) => Ok(value),
        _ => Err(MoveAbort::ArgumentType { position }),
    }
}

fn u64_argument(call: &MoveCall, position: usize) -> Result<u64, MoveAbort> {
    match pure_argument(call, position)? {
        PureValue::U64(value) => Ok(*value),
        _ => Err(MoveAbort::ArgumentType { position }),
    }
}

fn u8_argument(call: &MoveCall, position: usize) -> Result<u8, MoveAbort> {
    match pure_argument(call, position)? {
        PureValue::U8(value) => Ok(*value),
        _ => Err(MoveAbort::ArgumentType { position }),
    }
}

fn string_argument(call: &MoveCall, position: usize) -> Result<&str, MoveAbort> {
    match pure_argument(call, position)? {
        PureValue::String(value) => Ok(value),
        _ => Err(MoveAbort::ArgumentType { position }),
    }
}
