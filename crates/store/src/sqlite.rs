//! Embedded SQLite persistence for barcode allocation.
//!
//! `SqliteStore` implements the core store traits on top of rusqlite with
//! the bundled SQLite. The connection sits behind a `Mutex`, so in-process
//! callers are serialized; cross-process safety comes from SQLite's own
//! locking (`BEGIN IMMEDIATE` takes the write lock up front).
//!
//! The counter lives in an ordinary `sequences` table and is advanced
//! inside the same transaction that inserts the records, so counter state
//! and persisted rows can never diverge: a rollback undoes both.

use chrono::{DateTime, Utc};
use labcode_core::records::{Barcode, NewBarcode};
use labcode_core::store::{BarcodeStore, SequenceAllocator, StoreTransaction};
use labcode_core::{StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS barcodes_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS barcodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    prefix TEXT NOT NULL,
    barcode TEXT NOT NULL,
    created_at TEXT NOT NULL,
    group_id INTEGER REFERENCES barcodes_groups (id)
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_barcodes_prefix_barcode ON barcodes (prefix, barcode);
CREATE INDEX IF NOT EXISTS idx_barcodes_group_id ON barcodes (group_id);
";

const SELECT_BARCODE: &str = "SELECT id, prefix, barcode, created_at, group_id FROM barcodes";

/// SQLite-backed barcode store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    sequence_start: u64,
}

impl SqliteStore {
    /// Opens or creates a SQLite database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(connection_err)?;

        // WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(connection_err)?;

        Self::from_connection(conn)
    }

    /// Creates an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(connection_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(connection_err)?;
        conn.execute_batch(SCHEMA).map_err(execution_err)?;
        debug!("sqlite barcode store ready");

        Ok(Self {
            conn: Mutex::new(conn),
            sequence_start: 1,
        })
    }

    /// Sets the start value used when a sequence is created lazily.
    pub fn with_sequence_start(mut self, start: u64) -> Self {
        self.sequence_start = start;
        self
    }

    /// Seeds `name` at `start` if it does not exist yet.
    ///
    /// Intended for host startup, driven by configuration; an existing
    /// sequence is left untouched.
    pub fn ensure_sequence(&self, name: &str, start: u64) -> StoreResult<()> {
        let conn = self.lock()?;
        seed_sequence(&conn, name, start)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

fn connection_err(e: rusqlite::Error) -> StoreError {
    StoreError::Connection(e.to_string())
}

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn execution_err(e: rusqlite::Error) -> StoreError {
    StoreError::Execution(e.to_string())
}

/// Creates the sequence row at `start` unless it already exists.
///
/// The stored value is the last issued one, so seeding writes `start - 1`.
fn seed_sequence(conn: &Connection, name: &str, start: u64) -> StoreResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO sequences (name, value) VALUES (?1, ?2)",
        params![name.to_lowercase(), start as i64 - 1],
    )
    .map_err(execution_err)?;
    Ok(())
}

/// Advances `sequence` by `count` and returns the issued range as
/// `(first, last)` inclusive. Must run inside a transaction.
fn allocate_range(
    conn: &Connection,
    sequence: &str,
    count: u64,
    start: u64,
) -> StoreResult<(u64, u64)> {
    let name = sequence.to_lowercase();
    seed_sequence(conn, &name, start)?;

    conn.execute(
        "UPDATE sequences SET value = value + ?1 WHERE name = ?2",
        params![count as i64, name],
    )
    .map_err(execution_err)?;

    let last: i64 = conn
        .query_row(
            "SELECT value FROM sequences WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .map_err(query_err)?;

    let last = last as u64;
    Ok((last + 1 - count, last))
}

fn in_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    conn.execute_batch("BEGIN IMMEDIATE").map_err(execution_err)?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT").map_err(execution_err)?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

fn barcode_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Barcode> {
    Ok(Barcode {
        id: row.get(0)?,
        prefix: row.get(1)?,
        barcode: row.get(2)?,
        created_at: row.get::<_, DateTime<Utc>>(3)?,
        group_id: row.get(4)?,
    })
}

impl SequenceAllocator for SqliteStore {
    fn next(&self, sequence: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        in_transaction(&conn, |c| {
            allocate_range(c, sequence, 1, self.sequence_start).map(|(first, _)| first)
        })
    }

    fn next_n(&self, sequence: &str, count: usize) -> StoreResult<Vec<u64>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        in_transaction(&conn, |c| {
            let (first, last) = allocate_range(c, sequence, count as u64, self.sequence_start)?;
            Ok((first..=last).collect())
        })
    }
}

/// An open transaction holding the connection lock.
///
/// Dropping without [`StoreTransaction::commit`] rolls back.
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    sequence_start: u64,
    committed: bool,
}

impl SequenceAllocator for SqliteTransaction<'_> {
    fn next(&self, sequence: &str) -> StoreResult<u64> {
        allocate_range(&self.conn, sequence, 1, self.sequence_start).map(|(first, _)| first)
    }

    fn next_n(&self, sequence: &str, count: usize) -> StoreResult<Vec<u64>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let (first, last) = allocate_range(&self.conn, sequence, count as u64, self.sequence_start)?;
        Ok((first..=last).collect())
    }
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn insert_group(&self, created_at: DateTime<Utc>) -> StoreResult<i64> {
        self.conn
            .execute(
                "INSERT INTO barcodes_groups (created_at) VALUES (?1)",
                params![created_at],
            )
            .map_err(execution_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_barcode(&self, record: &NewBarcode<'_>) -> StoreResult<i64> {
        self.conn
            .execute(
                "INSERT INTO barcodes (prefix, barcode, created_at, group_id) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.prefix,
                    record.barcode,
                    record.created_at,
                    record.group_id
                ],
            )
            .map_err(execution_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT").map_err(execution_err)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

impl BarcodeStore for SqliteStore {
    fn begin(&self) -> StoreResult<Box<dyn StoreTransaction + '_>> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE").map_err(execution_err)?;
        Ok(Box::new(SqliteTransaction {
            conn,
            sequence_start: self.sequence_start,
            committed: false,
        }))
    }

    fn last_barcode(&self, prefix: &str) -> StoreResult<Option<Barcode>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "{} WHERE prefix = ?1 ORDER BY id DESC LIMIT 1",
                SELECT_BARCODE
            ),
            params![prefix],
            barcode_from_row,
        )
        .optional()
        .map_err(query_err)
    }

    fn barcodes_in_group(&self, group_id: i64) -> StoreResult<Vec<Barcode>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{} WHERE group_id = ?1 ORDER BY id", SELECT_BARCODE))
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![group_id], barcode_from_row)
            .map_err(query_err)?;

        let mut barcodes = Vec::new();
        for row in rows {
            barcodes.push(row.map_err(query_err)?);
        }
        Ok(barcodes)
    }
}
