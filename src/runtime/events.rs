//! Runtime event stream payloads.

use crate::types::{OpSeq, QuizId};

/// Events emitted from the single-writer store loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// A new quiz was stored.
    Created {
        /// Assigned quiz id.
        id: QuizId,
    },
    /// An existing quiz was edited.
    Updated {
        /// Edited quiz id.
        id: QuizId,
    },
    /// A quiz was removed.
    Deleted {
        /// Removed quiz id.
        id: QuizId,
    },
    /// Persistence has reached at least this op sequence.
    DurableUpTo {
        /// Highest sequence known durable.
        op_seq: OpSeq,
    },
}
