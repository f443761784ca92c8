//! Persistence abstraction for the quiz op journal.

/// SQLite journal implementation.
pub mod sqlite;

use thiserror::Error;

use crate::{
    core::store::{StoreError, StoreSnapshotV1},
    op::StoredOp,
    types::OpSeq,
};

/// Failures while writing or replaying the journal.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Underlying SQLite failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload (de)serialization failure.
    #[error("payload encoding: {0}")]
    Serde(#[from] serde_json::Error),
    /// Replayed journal is inconsistent with the store.
    #[error("replay: {0}")]
    Replay(#[from] StoreError),
    /// Stored payload written by an incompatible journal version.
    #[error("unsupported {what} format version {version}")]
    UnsupportedFormat {
        /// Payload kind, `op` or `snapshot`.
        what: &'static str,
        /// Version found on disk.
        version: u16,
    },
    /// Anything else, already formatted.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Destination for journaled store ops.
pub trait OpSink: Send {
    /// Appends `ops` in order, returning the highest durable sequence.
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq>;
    /// Forces buffered writes to stable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
    /// Records a full store image covering everything through `last_seq` and, when
    /// `compact` is set, drops the journal rows it covers. Returns the rows dropped.
    fn checkpoint(&mut self, _snapshot: &StoreSnapshotV1, _last_seq: OpSeq, _compact: bool) -> PersistResult<usize> {
        Ok(0)
    }
}
