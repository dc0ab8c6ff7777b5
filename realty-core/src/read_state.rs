// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A pass-through cache of decoded object snapshots.
//!
//! Entries are only ever replaced by re-fetching from the chain client. There is no expiry: an
//! entry stays until a confirmed write to its object invalidates it.
//!
//! Every object has a generation, bumped by each invalidation. A read that was started before an
//! invalidation, or that returns an older object version than the cached one, never replaces the
//! cached snapshot.

use dashmap::DashMap;
use realty_base::{
    data_types::{deserialize_u64_lenient, ObjectData},
    identifiers::{AccountAddress, ObjectId},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    client::{ChainClient, ChainClientError},
    transaction::COUNTER_MODULE,
};

#[cfg(test)]
#[path = "unit_tests/read_state.rs"]
mod tests;

/// A failure to read the state of an object.
#[derive(Debug, Error)]
pub enum ReadStateError {
    #[error("Object {0} does not exist or is not indexed yet")]
    NotFound(ObjectId),

    #[error("Object {object_id} has type {found}, expected a {expected}")]
    UnexpectedType {
        object_id: ObjectId,
        expected: String,
        found: String,
    },

    #[error("Object {object_id} has invalid content: {error}")]
    InvalidContent {
        object_id: ObjectId,
        #[source]
        error: serde_json::Error,
    },

    #[error(transparent)]
    Client(#[from] ChainClientError),
}

/// The typed contents of an on-chain object.
pub trait ObjectState: Clone + DeserializeOwned + Send + Sync + 'static {
    /// The module declaring the object's type.
    const MODULE: &'static str;
    /// The name of the object's type inside [`Self::MODULE`].
    const STRUCT: &'static str;

    /// Decodes the fields of `object`, checking that it has the expected type.
    fn decode(object: &ObjectData) -> Result<Self, ReadStateError> {
        if !object.is_struct(Self::MODULE, Self::STRUCT) {
            return Err(ReadStateError::UnexpectedType {
                object_id: object.object_id,
                expected: format!("{}::{}", Self::MODULE, Self::STRUCT),
                found: object.type_name.clone(),
            });
        }
        serde_json::from_value(serde_json::Value::Object(object.fields.clone())).map_err(
            |error| ReadStateError::InvalidContent {
                object_id: object.object_id,
                error,
            },
        )
    }
}

/// The state of a counter object.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CounterState {
    #[serde(deserialize_with = "deserialize_u64_lenient")]
    pub value: u64,
    pub owner: AccountAddress,
}

impl ObjectState for CounterState {
    const MODULE: &'static str = COUNTER_MODULE;
    const STRUCT: &'static str = "Counter";
}

/// A cache holding at most one decoded snapshot per object.
pub struct ReadStateCache<Client, State> {
    client: Client,
    entries: DashMap<ObjectId, Slot<State>>,
}

struct Slot<State> {
    generation: u64,
    snapshot: Option<Snapshot<State>>,
}

struct Snapshot<State> {
    version: u64,
    state: State,
}

impl<State> Default for Slot<State> {
    fn default() -> Self {
        Slot {
            generation: 0,
            snapshot: None,
        }
    }
}

impl<Client, State> ReadStateCache<Client, State>
where
    Client: ChainClient,
    State: ObjectState,
{
    pub fn new(client: Client) -> Self {
        ReadStateCache {
            client,
            entries: DashMap::new(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns [`true`] if a snapshot of `object_id` is cached.
    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.entries
            .get(object_id)
            .is_some_and(|slot| slot.snapshot.is_some())
    }

    /// Returns the snapshot of `object_id`, querying the chain client if it isn't cached.
    pub async fn get(&self, object_id: ObjectId) -> Result<State, ReadStateError> {
        if let Some(state) = self.cached(&object_id) {
            trace!(%object_id, "Read state cache hit");
            return Ok(state);
        }
        self.fetch(object_id).await
    }

    /// Drops the cached snapshot of `object_id`, so that the next [`Self::get`] queries the
    /// chain client. Reads of `object_id` still in flight will not be cached.
    pub fn invalidate(&self, object_id: &ObjectId) {
        let mut slot = self.entries.entry(*object_id).or_default();
        slot.generation += 1;
        if slot.snapshot.take().is_some() {
            debug!(%object_id, generation = slot.generation, "Invalidated read state");
        }
    }

    /// Invalidates and immediately re-fetches the snapshot of `object_id`.
    pub async fn refresh(&self, object_id: ObjectId) -> Result<State, ReadStateError> {
        self.invalidate(&object_id);
        self.fetch(object_id).await
    }

    fn cached(&self, object_id: &ObjectId) -> Option<State> {
        let slot = self.entries.get(object_id)?;
        slot.snapshot.as_ref().map(|snapshot| snapshot.state.clone())
    }

    async fn fetch(&self, object_id: ObjectId) -> Result<State, ReadStateError> {
        let generation = self
            .entries
            .get(&object_id)
            .map_or(0, |slot| slot.generation);
        let object = self
            .client
            .get_object(object_id)
            .await?
            .ok_or(ReadStateError::NotFound(object_id))?;
        let state = State::decode(&object)?;

        let mut slot = self.entries.entry(object_id).or_default();
        if let Some(cached) = &slot.snapshot {
            if slot.generation != generation || cached.version > object.version {
                trace!(
                    %object_id,
                    version = object.version,
                    cached_version = cached.version,
                    "Superseded read, keeping the cached snapshot"
                );
                return Ok(cached.state.clone());
            }
        } else if slot.generation != generation {
            trace!(%object_id, version = object.version, "Read raced an invalidation, not caching");
            return Ok(state);
        }
        debug!(%object_id, version = object.version, "Fetched read state");
        slot.snapshot = Some(Snapshot {
            version: object.version,
            state: state.clone(),
        });
        Ok(state)
    }
}
