use std::io;

use thiserror::Error;

use crate::{
    core::store::StoreError,
    quiz::ValidationError,
    runtime::handle::RuntimeError,
    types::QuizId,
};

/// Everything that can cut a command short.
///
/// Inspected once by [`crate::session::engine::SessionEngine::dispatch`], which turns each
/// variant into report lines and returns the surface to ready.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A command that needs `<id>` got none.
    #[error("missing parameter <id>")]
    MissingParameter,
    /// The `<id>` argument is not a number.
    #[error("the value of parameter <id> is not a number: {0:?}")]
    InvalidParameter(String),
    /// No quiz with the given id.
    #[error("no quiz with id={0}")]
    NotFound(QuizId),
    /// The store rejected the record content.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Unexpected store failure.
    #[error("store error: {0}")]
    Store(RuntimeError),
    /// The line surface failed.
    #[error("input error: {0}")]
    Io(#[from] io::Error),
    /// The first word of the line is not a command.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
    /// The line surface was closed while waiting for input.
    #[error("input closed")]
    Closed,
}

impl From<RuntimeError> for SessionError {
    fn from(value: RuntimeError) -> Self {
        match value {
            RuntimeError::Store(StoreError::Validation(err)) => Self::Validation(err),
            RuntimeError::Store(StoreError::MissingQuiz(id)) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl SessionError {
    /// Human-readable lines for the surface: one per field for validation failures.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            Self::Validation(err) => std::iter::once("the quiz is invalid:".to_string())
                .chain(err.violations.iter().map(|v| v.message.clone()))
                .collect(),
            other => vec![other.to_string()],
        }
    }
}
