// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use super::{AtomicWork, Body, RawRecord, RecordStore, new_id};
use crate::error::{LedgerError, LedgerResult, StorageError};
use crate::models::Collection;

/// Keys written by earlier releases whose layout is no longer readable.
const OBSOLETE_KEYS: [&str; 4] = [
    "charity.products.v1",
    "charity.products.v2",
    "charity.products.v3",
    "charity.sales.v1",
];

/// Single-document backend: each collection is a JSON array, newest first,
/// stored under its versioned key.
pub struct JsonFileStore {
    path: Option<PathBuf>,
    doc: BTreeMap<&'static str, Vec<RawRecord>>,
    deferred: bool,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let mut store = JsonFileStore {
            path: Some(path.to_path_buf()),
            doc: BTreeMap::new(),
            deferred: false,
        };
        if path.exists() {
            let text = fs::read_to_string(path)?;
            let raw: Map<String, Value> = if text.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&text)?
            };
            if store.load(raw)? {
                store.flush()?;
            }
        }
        tracing::debug!(path = %path.display(), "opened json store");
        Ok(store)
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        JsonFileStore {
            path: None,
            doc: BTreeMap::new(),
            deferred: false,
        }
    }

    /// Returns true when the loaded document needed cleanup.
    fn load(&mut self, mut raw: Map<String, Value>) -> LedgerResult<bool> {
        let mut dirty = false;
        for key in OBSOLETE_KEYS {
            if raw.remove(key).is_some() {
                tracing::warn!(key, "dropping obsolete storage key");
                dirty = true;
            }
        }
        for c in Collection::ALL {
            let Some(value) = raw.remove(c.storage_key()) else {
                continue;
            };
            let mut records: Vec<RawRecord> =
                serde_json::from_value(value).map_err(|e| StorageError::Malformed {
                    collection: c.table(),
                    detail: e.to_string(),
                })?;
            // Records saved before sequence numbers existed are newest first.
            if records.iter().any(|r| r.seq <= 0) {
                let n = records.len() as i64;
                for (i, r) in records.iter_mut().enumerate() {
                    r.seq = n - i as i64;
                }
                dirty = true;
            }
            self.doc.insert(c.storage_key(), records);
        }
        for key in raw.keys() {
            tracing::warn!(%key, "ignoring unknown storage key");
        }
        Ok(dirty)
    }

    fn records(&self, collection: Collection) -> &[RawRecord] {
        self.doc
            .get(collection.storage_key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn records_mut(&mut self, collection: Collection) -> &mut Vec<RawRecord> {
        self.doc.entry(collection.storage_key()).or_default()
    }

    fn flush(&self) -> LedgerResult<()> {
        if self.deferred {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.doc)?)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), "flushed json store");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn list(&self, collection: Collection) -> LedgerResult<Vec<RawRecord>> {
        Ok(self.records(collection).to_vec())
    }

    fn create(&mut self, collection: Collection, body: Body) -> LedgerResult<RawRecord> {
        let now = Utc::now();
        let records = self.records_mut(collection);
        let seq = records.iter().map(|r| r.seq).max().unwrap_or(0) + 1;
        let record = RawRecord {
            id: new_id(),
            seq,
            created_at: now,
            updated_at: now,
            body,
        };
        records.insert(0, record.clone());
        self.flush()?;
        Ok(record)
    }

    fn update(&mut self, collection: Collection, id: &str, body: Body) -> LedgerResult<RawRecord> {
        let record = self
            .records_mut(collection)
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| LedgerError::not_found(collection.table(), id))?;
        record.body = body;
        record.updated_at = Utc::now();
        let updated = record.clone();
        self.flush()?;
        Ok(updated)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> LedgerResult<()> {
        let records = self.records_mut(collection);
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(LedgerError::not_found(collection.table(), id));
        }
        self.flush()
    }

    fn rewrite(&mut self, collection: Collection, changed: &[RawRecord]) -> LedgerResult<()> {
        let records = self.records_mut(collection);
        for c in changed {
            let slot = records
                .iter_mut()
                .find(|r| r.id == c.id)
                .ok_or_else(|| LedgerError::not_found(collection.table(), &c.id))?;
            slot.body = c.body.clone();
        }
        self.flush()
    }

    fn atomic(&mut self, work: &mut AtomicWork<'_>) -> LedgerResult<()> {
        let snapshot = self.doc.clone();
        let was_deferred = self.deferred;
        self.deferred = true;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let store: &mut dyn RecordStore = &mut *self;
            work(store)
        }));
        self.deferred = was_deferred;
        let result = match outcome {
            Ok(r) => r.and_then(|()| self.flush()),
            Err(payload) => {
                self.doc = snapshot;
                panic::resume_unwind(payload)
            }
        };
        if result.is_err() {
            self.doc = snapshot;
        }
        result
    }
}
