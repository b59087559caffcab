// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{AtomicWork, Body, RawRecord, RecordStore, new_id};
use crate::error::{LedgerError, LedgerResult, StorageError};
use crate::models::Collection;

/// SQLite backend: one table per collection, bodies stored as JSON text.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> LedgerResult<Self> {
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    fn fetch(&self, collection: Collection, id: &str) -> LedgerResult<Option<RawRecord>> {
        let sql = format!(
            "SELECT seq, id, created_at, updated_at, body FROM {} WHERE id=?1",
            collection.table()
        );
        let row = self
            .conn
            .query_row(&sql, params![id], read_row)
            .optional()?;
        row.map(|r| decode_row(collection, r)).transpose()
    }

    fn rollback(&self) {
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %e, "rollback failed");
        }
    }
}

fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    for c in Collection::ALL {
        conn.execute_batch(&format!(
            r#"
        CREATE TABLE IF NOT EXISTS {table}(
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            body TEXT NOT NULL
        );
        "#,
            table = c.table()
        ))?;
    }
    Ok(())
}

type Row5 = (i64, String, DateTime<Utc>, DateTime<Utc>, String);

fn read_row(r: &Row<'_>) -> rusqlite::Result<Row5> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn decode_row(collection: Collection, row: Row5) -> LedgerResult<RawRecord> {
    let (seq, id, created_at, updated_at, body) = row;
    let body: Body = serde_json::from_str(&body).map_err(|e| StorageError::Malformed {
        collection: collection.table(),
        detail: format!("record '{}': {}", id, e),
    })?;
    Ok(RawRecord {
        id,
        seq,
        created_at,
        updated_at,
        body,
    })
}

impl RecordStore for SqliteStore {
    fn list(&self, collection: Collection) -> LedgerResult<Vec<RawRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT seq, id, created_at, updated_at, body FROM {} ORDER BY seq DESC",
            collection.table()
        ))?;
        let rows = stmt.query_map([], read_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode_row(collection, row?)?);
        }
        Ok(out)
    }

    fn get(&self, collection: Collection, id: &str) -> LedgerResult<Option<RawRecord>> {
        self.fetch(collection, id)
    }

    fn create(&mut self, collection: Collection, body: Body) -> LedgerResult<RawRecord> {
        let id = new_id();
        let now = Utc::now();
        self.conn.execute(
            &format!(
                "INSERT INTO {}(id, created_at, updated_at, body) VALUES (?1, ?2, ?3, ?4)",
                collection.table()
            ),
            params![id, now, now, serde_json::to_string(&body)?],
        )?;
        let seq = self.conn.last_insert_rowid();
        tracing::debug!(%collection, %id, seq, "inserted row");
        Ok(RawRecord {
            id,
            seq,
            created_at: now,
            updated_at: now,
            body,
        })
    }

    fn update(&mut self, collection: Collection, id: &str, body: Body) -> LedgerResult<RawRecord> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET body=?1, updated_at=?2 WHERE id=?3",
                collection.table()
            ),
            params![serde_json::to_string(&body)?, Utc::now(), id],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(collection.table(), id));
        }
        self.fetch(collection, id)?
            .ok_or_else(|| LedgerError::not_found(collection.table(), id))
    }

    fn delete(&mut self, collection: Collection, id: &str) -> LedgerResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id=?1", collection.table()),
            params![id],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(collection.table(), id));
        }
        Ok(())
    }

    fn rewrite(&mut self, collection: Collection, records: &[RawRecord]) -> LedgerResult<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("UPDATE {} SET body=?1 WHERE id=?2", collection.table()))?;
        for r in records {
            if stmt.execute(params![serde_json::to_string(&r.body)?, r.id])? == 0 {
                return Err(LedgerError::not_found(collection.table(), &r.id));
            }
        }
        Ok(())
    }

    fn atomic(&mut self, work: &mut AtomicWork<'_>) -> LedgerResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let store: &mut dyn RecordStore = &mut *self;
            work(store)
        }));
        match outcome {
            Ok(Ok(())) => {
                if let Err(e) = self.conn.execute_batch("COMMIT") {
                    self.rollback();
                    return Err(e.into());
                }
                Ok(())
            }
            Ok(Err(e)) => {
                self.rollback();
                Err(e)
            }
            Err(payload) => {
                self.rollback();
                panic::resume_unwind(payload)
            }
        }
    }
}
