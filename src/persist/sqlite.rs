//! SQLite-backed quiz journal: an append-only `events` table of applied ops plus
//! `snapshots` of the whole store.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    core::store::{QuizStore, StoreSnapshotV1},
    op::{Op, StoredOp},
    types::OpSeq,
};

use super::{OpSink, PersistError, PersistResult};

const FORMAT_VERSION: u16 = 1;

/// Payload column contents: a body tagged with the journal format version.
#[derive(Serialize, Deserialize)]
struct Versioned<T> {
    format_version: u16,
    body: T,
}

fn encode<T: Serialize>(body: &T) -> PersistResult<Vec<u8>> {
    Ok(serde_json::to_vec(&Versioned {
        format_version: FORMAT_VERSION,
        body,
    })?)
}

fn decode<T: DeserializeOwned>(what: &'static str, payload: &[u8]) -> PersistResult<T> {
    let env: Versioned<T> = serde_json::from_slice(payload)?;
    if env.format_version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedFormat {
            what,
            version: env.format_version,
        });
    }
    Ok(env.body)
}

fn op_kind(op: &Op) -> &'static str {
    match op {
        Op::Insert { .. } => "insert",
        Op::Update { .. } => "update",
        Op::Delete { .. } => "delete",
    }
}

/// SQLite implementation of [`crate::persist::OpSink`].
pub struct SqliteOpSink {
    conn: Connection,
}

impl SqliteOpSink {
    /// Opens or creates the journal at `path` in WAL mode.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Journal that lives only as long as the sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Rebuilds the store from the newest snapshot and the events after it.
    pub fn load_store(&self) -> PersistResult<QuizStore> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots ORDER BY last_seq DESC LIMIT 1",
                [],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        let mut store = match snapshot {
            Some(payload) => QuizStore::from_snapshot(decode("snapshot", &payload)?)?,
            None => QuizStore::new(),
        };

        let tail = self.load_events_after(store.latest_op_seq())?;
        tracing::debug!(
            records = store.len(),
            tail_ops = tail.len(),
            "replaying quiz journal"
        );
        for stored in tail {
            store.apply_replayed_op(stored)?;
        }
        Ok(store)
    }

    /// Loads journaled ops strictly after `seq`, oldest first.
    pub fn load_events_after(&self, seq: OpSeq) -> PersistResult<Vec<StoredOp>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, ts_ms, payload FROM events WHERE seq > ?1 ORDER BY seq ASC")?;
        let rows = stmt
            .query_map(params![seq as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, Vec<u8>>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, ts_ms, payload)| {
                Ok(StoredOp {
                    seq: seq as OpSeq,
                    ts_ms: ts_ms as u64,
                    op: decode("op", &payload)?,
                })
            })
            .collect()
    }

    /// Highest op sequence the journal accounts for, through events or a snapshot.
    pub fn journal_head(&self) -> PersistResult<OpSeq> {
        let head: Option<i64> = self.conn.query_row(
            "SELECT MAX(s) FROM (SELECT MAX(seq) AS s FROM events \
             UNION ALL SELECT MAX(last_seq) FROM snapshots)",
            [],
            |row| row.get(0),
        )?;
        Ok(head.unwrap_or(0) as OpSeq)
    }
}

fn insert_events(tx: &Transaction<'_>, ops: &[StoredOp]) -> PersistResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO events(seq, ts_ms, kind, quiz_id, payload) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for stored in ops {
        stmt.execute(params![
            stored.seq as i64,
            stored.ts_ms as i64,
            op_kind(&stored.op),
            stored.op.quiz_id(),
            encode(&stored.op)?,
        ])?;
    }
    Ok(())
}

impl OpSink for SqliteOpSink {
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq> {
        let Some(last) = ops.last() else {
            return self.journal_head();
        };
        let tx = self.conn.transaction()?;
        insert_events(&tx, ops)?;
        tx.commit()?;
        Ok(last.seq)
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }

    // Snapshot and compaction commit together, so a crash never leaves events dropped
    // without the snapshot that covers them.
    fn checkpoint(&mut self, snapshot: &StoreSnapshotV1, last_seq: OpSeq, compact: bool) -> PersistResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO snapshots(last_seq, quiz_count, payload) VALUES (?1, ?2, ?3)",
            params![last_seq as i64, snapshot.records.len() as i64, encode(snapshot)?],
        )?;
        let removed = if compact {
            tx.execute("DELETE FROM snapshots WHERE last_seq < ?1", params![last_seq as i64])?;
            tx.execute("DELETE FROM events WHERE seq <= ?1", params![last_seq as i64])?
        } else {
            0
        };
        tx.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_a_newer_journal_are_refused() {
        let sink = SqliteOpSink::open_in_memory().expect("open");
        let payload = br#"{"format_version":2,"body":{"Delete":{"id":1}}}"#.to_vec();
        sink.conn
            .execute(
                "INSERT INTO events(seq, ts_ms, kind, quiz_id, payload) VALUES (1, 0, 'delete', 1, ?1)",
                params![payload],
            )
            .expect("insert");

        let err = sink.load_events_after(0).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnsupportedFormat { what: "op", version: 2 }
        ));
    }

    #[test]
    fn unknown_kind_is_rejected_by_the_schema() {
        let sink = SqliteOpSink::open_in_memory().expect("open");
        let res = sink.conn.execute(
            "INSERT INTO events(seq, ts_ms, kind, quiz_id, payload) VALUES (1, 0, 'rename', 1, x'00')",
            [],
        );
        assert!(res.is_err());
    }
}
