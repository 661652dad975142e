//! SQLite-backed slot storage.
//!
//! Slots and the event log share one database so a call's writes and its
//! events commit in the same transaction.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use tally_types::{EmittedEvent, EventSeq, LedgerEvent, Slot, Timestamp};

use crate::secure_path::prepare_db_path;
use crate::{ChangeSet, SlotStore, StoreError};

pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS slots (
            slot BLOB PRIMARY KEY,
            value BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            seq INTEGER PRIMARY KEY,
            emitted_at INTEGER NOT NULL,
            payload TEXT NOT NULL
        );
    ";

    /// Open or create a ledger database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        prepare_db_path(path)?;

        let db = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened ledger database");
        Self::initialize(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(db: Connection) -> Result<Self, StoreError> {
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        db.execute_batch(Self::SCHEMA)?;
        Ok(Self { db })
    }

    /// Number of non-empty slots.
    pub fn slot_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl SlotStore for SqliteStore {
    fn load(&self, slot: &Slot) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .db
            .query_row(
                "SELECT value FROM slots WHERE slot = ?1",
                [slot.as_bytes().as_slice()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn apply(&mut self, changes: ChangeSet) -> Result<Vec<EmittedEvent>, StoreError> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self.db.transaction()?;

        for (slot, value) in &changes.writes {
            if value.is_empty() {
                tx.execute(
                    "DELETE FROM slots WHERE slot = ?1",
                    [slot.as_bytes().as_slice()],
                )?;
            } else {
                tx.execute(
                    "INSERT INTO slots (slot, value) VALUES (?1, ?2)
                     ON CONFLICT(slot) DO UPDATE SET value = excluded.value",
                    params![slot.as_bytes().as_slice(), value],
                )?;
            }
        }

        let last: i64 = tx.query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
            row.get(0)
        })?;
        let mut next = EventSeq::new(last as u64).next();
        let mut recorded = Vec::with_capacity(changes.events.len());
        for event in changes.events {
            let payload = serde_json::to_string(&event).map_err(StoreError::EventEncoding)?;
            tx.execute(
                "INSERT INTO events (seq, emitted_at, payload) VALUES (?1, ?2, ?3)",
                params![
                    next.value() as i64,
                    changes.emitted_at.as_secs() as i64,
                    payload
                ],
            )?;
            recorded.push(EmittedEvent {
                seq: next,
                emitted_at: changes.emitted_at,
                event,
            });
            next = next.next();
        }

        tx.commit()?;
        Ok(recorded)
    }

    fn events_since(&self, after: Option<EventSeq>) -> Result<Vec<EmittedEvent>, StoreError> {
        let after = after.map_or(0, EventSeq::value) as i64;
        let mut stmt = self.db.prepare(
            "SELECT seq, emitted_at, payload FROM events WHERE seq > ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map([after], |row| {
            let seq: i64 = row.get(0)?;
            let emitted_at: i64 = row.get(1)?;
            let payload: String = row.get(2)?;
            Ok((seq, emitted_at, payload))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (seq, emitted_at, payload) = row?;
            let event: LedgerEvent =
                serde_json::from_str(&payload).map_err(|source| StoreError::CorruptEvent {
                    seq: seq as u64,
                    source,
                })?;
            events.push(EmittedEvent {
                seq: EventSeq::new(seq as u64),
                emitted_at: Timestamp::from_secs(emitted_at as u64),
                event,
            });
        }
        Ok(events)
    }
}
