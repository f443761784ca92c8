//! Mutation operation model.

use serde::{Deserialize, Serialize};

use crate::{
    quiz::{QuizPatch, QuizRecord},
    types::{OpSeq, QuizId},
};

/// Immutable operation appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Insert a fully materialized quiz.
    Insert {
        /// Inserted record.
        quiz: QuizRecord,
    },
    /// Overwrite fields of an existing quiz.
    Update {
        /// Quiz id to mutate.
        id: QuizId,
        /// Forward patch.
        patch: QuizPatch,
    },
    /// Remove a quiz.
    Delete {
        /// Quiz id to remove.
        id: QuizId,
    },
}

impl Op {
    /// Id of the quiz this op touches.
    pub fn quiz_id(&self) -> QuizId {
        match self {
            Op::Insert { quiz } => quiz.id,
            Op::Update { id, .. } | Op::Delete { id } => *id,
        }
    }
}

/// Journal row metadata plus operation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}
