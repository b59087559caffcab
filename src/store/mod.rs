// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record stores. Both backends keep each collection as an ordered list of
//! JSON bodies wrapped in store-assigned identity.

pub mod json_file;
pub mod sqlite;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Backend, Config};
use crate::error::{LedgerResult, StorageError};
use crate::models::{Collection, Record};

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

pub type Body = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub seq: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: Body,
}

impl RawRecord {
    pub fn decode<T: DeserializeOwned>(&self, collection: Collection) -> LedgerResult<Record<T>> {
        let data = serde_json::from_value(Value::Object(self.body.clone())).map_err(|e| {
            StorageError::Malformed {
                collection: collection.table(),
                detail: format!("record '{}': {}", self.id, e),
            }
        })?;
        Ok(Record {
            id: self.id.clone(),
            seq: self.seq,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data,
        })
    }
}

pub fn encode<T: Serialize>(collection: Collection, data: &T) -> LedgerResult<Body> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Malformed {
            collection: collection.table(),
            detail: format!("expected an object body, got {}", other),
        }
        .into()),
    }
}

/// Work run inside [`RecordStore::atomic`].
pub type AtomicWork<'a> = dyn FnMut(&mut dyn RecordStore) -> LedgerResult<()> + 'a;

/// Durable keyed storage for every collection.
///
/// `list` returns newest records first. Callers needing another order sort
/// for themselves.
pub trait RecordStore: Send {
    fn list(&self, collection: Collection) -> LedgerResult<Vec<RawRecord>>;

    /// Assigns id, sequence number and timestamps.
    fn create(&mut self, collection: Collection, body: Body) -> LedgerResult<RawRecord>;

    /// Replaces the body and bumps `updated_at`. Fails with `NotFound`.
    fn update(&mut self, collection: Collection, id: &str, body: Body) -> LedgerResult<RawRecord>;

    /// Fails with `NotFound`.
    fn delete(&mut self, collection: Collection, id: &str) -> LedgerResult<()>;

    /// Overwrites the bodies of existing records as given, leaving their
    /// timestamps alone. Used for derived-field refreshes.
    fn rewrite(&mut self, collection: Collection, records: &[RawRecord]) -> LedgerResult<()>;

    /// Runs `work` so that either all of its writes persist or none do.
    fn atomic(&mut self, work: &mut AtomicWork<'_>) -> LedgerResult<()>;

    fn get(&self, collection: Collection, id: &str) -> LedgerResult<Option<RawRecord>> {
        Ok(self.list(collection)?.into_iter().find(|r| r.id == id))
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Opens the backend selected by configuration.
pub fn open(config: &Config) -> Result<Box<dyn RecordStore>> {
    let dir = config.data_dir()?;
    let store: Box<dyn RecordStore> = match config.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&dir.join("charityledger.sqlite"))?),
        Backend::Json => Box::new(JsonFileStore::open(&dir.join("charityledger.json"))?),
    };
    tracing::debug!(backend = %config.backend, dir = %dir.display(), "record store opened");
    Ok(store)
}
