use async_trait::async_trait;

use crate::{
    quiz::{QuizDraft, QuizPatch, QuizRecord},
    runtime::handle::{QuizStoreHandle, RuntimeError},
    types::QuizId,
};

/// The quiz persistence contract the session engine relies on.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new quiz or rejects its content.
    async fn create(&self, draft: QuizDraft) -> Result<QuizRecord, RuntimeError>;
    /// Every quiz, in store order.
    async fn find_all(&self) -> Result<Vec<QuizRecord>, RuntimeError>;
    /// One quiz, if it exists.
    async fn find_by_id(&self, id: QuizId) -> Result<Option<QuizRecord>, RuntimeError>;
    /// Writes the fields set in `patch` back to quiz `id`.
    async fn update(&self, id: QuizId, patch: QuizPatch) -> Result<QuizRecord, RuntimeError>;
    /// Removes quiz `id`; a missing id removes nothing and succeeds.
    async fn destroy(&self, id: QuizId) -> Result<usize, RuntimeError>;
}

#[async_trait]
impl RecordStore for QuizStoreHandle {
    async fn create(&self, draft: QuizDraft) -> Result<QuizRecord, RuntimeError> {
        QuizStoreHandle::create(self, draft).await
    }

    async fn find_all(&self) -> Result<Vec<QuizRecord>, RuntimeError> {
        self.all().await
    }

    async fn find_by_id(&self, id: QuizId) -> Result<Option<QuizRecord>, RuntimeError> {
        self.get(id).await
    }

    async fn update(&self, id: QuizId, patch: QuizPatch) -> Result<QuizRecord, RuntimeError> {
        QuizStoreHandle::update(self, id, patch).await
    }

    async fn destroy(&self, id: QuizId) -> Result<usize, RuntimeError> {
        QuizStoreHandle::destroy(self, id).await
    }
}
