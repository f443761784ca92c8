use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    op::{Op, StoredOp},
    quiz::{QuizDraft, QuizPatch, QuizRecord, ValidationError},
    types::{OpSeq, QuizId},
};

/// Failures of store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Record content rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Target id is not stored.
    #[error("no quiz with id={0}")]
    MissingQuiz(QuizId),
    /// Replayed insert collides with an existing id.
    #[error("quiz id={0} already exists")]
    AlreadyExists(QuizId),
}

/// Serializable full store image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshotV1 {
    /// Next id to hand out.
    pub next_quiz_id: QuizId,
    /// Next op sequence to assign.
    pub next_op_seq: OpSeq,
    /// Records in insertion order.
    pub records: Vec<QuizRecord>,
}

/// Authoritative quiz records in insertion order.
#[derive(Debug, Default)]
pub struct QuizStore {
    records: HashMap<QuizId, QuizRecord>,
    order: Vec<QuizId>,
    pending_ops: Vec<StoredOp>,
    next_op_seq: OpSeq,
    next_quiz_id: QuizId,
}

impl QuizStore {
    /// Empty store whose first id is 1.
    pub fn new() -> Self {
        Self {
            next_op_seq: 1,
            next_quiz_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> Result<Self, StoreError> {
        let mut store = Self {
            next_quiz_id: snapshot.next_quiz_id,
            next_op_seq: snapshot.next_op_seq,
            ..Self::default()
        };

        for rec in snapshot.records {
            if store.records.contains_key(&rec.id) {
                return Err(StoreError::AlreadyExists(rec.id));
            }
            store.order.push(rec.id);
            store.records.insert(rec.id, rec);
        }

        Ok(store)
    }

    /// Captures the current state.
    pub fn export_snapshot(&self) -> StoreSnapshotV1 {
        StoreSnapshotV1 {
            next_quiz_id: self.next_quiz_id,
            next_op_seq: self.next_op_seq,
            records: self.all_cloned(),
        }
    }

    /// Validates `draft`, assigns the next id and records an insert op.
    pub fn create(&mut self, draft: QuizDraft) -> Result<(QuizRecord, StoredOp), StoreError> {
        draft.validate()?;

        let id = self.next_quiz_id;
        self.next_quiz_id += 1;

        let quiz = QuizRecord {
            id,
            question: draft.question,
            answer: draft.answer,
        };

        let stored = self.apply_insert(quiz.clone())?;
        self.pending_ops.push(stored.clone());
        Ok((quiz, stored))
    }

    /// Validates and applies `patch` to `id`, returning the updated record.
    pub fn update(&mut self, id: QuizId, patch: QuizPatch) -> Result<(QuizRecord, StoredOp), StoreError> {
        patch.validate()?;
        let stored = self.apply_update(id, patch)?;
        self.pending_ops.push(stored.clone());
        let rec = self.get_cloned(id).ok_or(StoreError::MissingQuiz(id))?;
        Ok((rec, stored))
    }

    /// Removes `id` if present. Returns the number of removed records and the op, if any.
    pub fn destroy(&mut self, id: QuizId) -> (usize, Option<StoredOp>) {
        if !self.records.contains_key(&id) {
            return (0, None);
        }
        let seq = self.take_next_op_seq();
        let stored = self.apply_delete_with_seq(id, seq);
        self.pending_ops.push(stored.clone());
        (1, Some(stored))
    }

    /// Re-applies a journaled op, keeping its sequence number.
    pub fn apply_replayed_op(&mut self, stored: StoredOp) -> Result<(), StoreError> {
        let seq = stored.seq;
        match stored.op {
            Op::Insert { quiz } => {
                self.apply_insert_with_seq(quiz, seq)?;
            }
            Op::Update { id, patch } => {
                self.apply_update_with_seq(id, patch, seq)?;
            }
            Op::Delete { id } => {
                if !self.records.contains_key(&id) {
                    return Err(StoreError::MissingQuiz(id));
                }
                self.apply_delete_with_seq(id, seq);
            }
        }
        Ok(())
    }

    /// Borrows the record with `id`.
    pub fn get(&self, id: QuizId) -> Option<&QuizRecord> {
        self.records.get(&id)
    }

    /// Clones the record with `id`.
    pub fn get_cloned(&self, id: QuizId) -> Option<QuizRecord> {
        self.get(id).cloned()
    }

    /// Records in insertion order.
    pub fn all(&self) -> Vec<&QuizRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Clones all records in insertion order.
    pub fn all_cloned(&self) -> Vec<QuizRecord> {
        self.all().into_iter().cloned().collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids in insertion order.
    pub fn ordered_ids(&self) -> &[QuizId] {
        &self.order
    }

    /// Takes the ops recorded since the last drain.
    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        std::mem::take(&mut self.pending_ops)
    }

    /// Sequence number of the most recent op, 0 when none.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    fn apply_insert(&mut self, quiz: QuizRecord) -> Result<StoredOp, StoreError> {
        let seq = self.take_next_op_seq();
        self.apply_insert_with_seq(quiz, seq)
    }

    fn apply_insert_with_seq(&mut self, quiz: QuizRecord, seq: OpSeq) -> Result<StoredOp, StoreError> {
        if self.records.contains_key(&quiz.id) {
            return Err(StoreError::AlreadyExists(quiz.id));
        }

        let id = quiz.id;
        self.next_quiz_id = self.next_quiz_id.max(id.saturating_add(1));
        self.order.push(id);
        self.records.insert(id, quiz.clone());

        self.bump_next_seq_from(seq);
        Ok(StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Insert { quiz },
        })
    }

    fn apply_update(&mut self, id: QuizId, patch: QuizPatch) -> Result<StoredOp, StoreError> {
        if !self.records.contains_key(&id) {
            return Err(StoreError::MissingQuiz(id));
        }
        let seq = self.take_next_op_seq();
        self.apply_update_with_seq(id, patch, seq)
    }

    fn apply_update_with_seq(&mut self, id: QuizId, patch: QuizPatch, seq: OpSeq) -> Result<StoredOp, StoreError> {
        let rec = self.records.get_mut(&id).ok_or(StoreError::MissingQuiz(id))?;
        patch.apply_to(rec);

        self.bump_next_seq_from(seq);
        Ok(StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Update { id, patch },
        })
    }

    fn apply_delete_with_seq(&mut self, id: QuizId, seq: OpSeq) -> StoredOp {
        self.records.remove(&id);
        if let Some(pos) = self.order.iter().position(|x| *x == id) {
            self.order.remove(pos);
        }

        self.bump_next_seq_from(seq);
        StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Delete { id },
        }
    }

    fn take_next_op_seq(&mut self) -> OpSeq {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        seq
    }

    fn bump_next_seq_from(&mut self, seq: OpSeq) {
        self.next_op_seq = self.next_op_seq.max(seq.saturating_add(1));
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
