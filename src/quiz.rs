//! Quiz domain record, draft, patch, and content validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::QuizId;

/// Fully materialized, authoritative quiz record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    /// Stable quiz identifier.
    pub id: QuizId,
    /// Question text shown to the user.
    pub question: String,
    /// Expected answer.
    pub answer: String,
}

/// Create payload used to build a new [`QuizRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    /// Question text.
    pub question: String,
    /// Expected answer.
    pub answer: String,
}

impl QuizDraft {
    /// Builds a draft from anything string-like.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Checks the content rules a stored record must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        check_field(&mut violations, QuizField::Question, &self.question);
        check_field(&mut violations, QuizField::Answer, &self.answer);
        ValidationError::from_violations(violations)
    }
}

/// Sparse patch where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizPatch {
    /// Optional replacement question.
    pub question: Option<String>,
    /// Optional replacement answer.
    pub answer: Option<String>,
}

impl QuizPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validates only the fields present in the patch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        if let Some(q) = &self.question {
            check_field(&mut violations, QuizField::Question, q);
        }
        if let Some(a) = &self.answer {
            check_field(&mut violations, QuizField::Answer, a);
        }
        ValidationError::from_violations(violations)
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut QuizRecord) {
        if let Some(v) = &self.question {
            rec.question = v.clone();
        }
        if let Some(v) = &self.answer {
            rec.answer = v.clone();
        }
    }
}

/// Editable quiz fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizField {
    /// The question text.
    Question,
    /// The expected answer.
    Answer,
}

impl fmt::Display for QuizField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => f.write_str("question"),
            Self::Answer => f.write_str("answer"),
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Offending field.
    pub field: QuizField,
    /// Human-readable reason.
    pub message: String,
}

/// Record content rejected by the store, one entry per violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quiz: {}", summary(.violations))]
pub struct ValidationError {
    /// All violations found, in field order.
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    fn from_violations(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

fn check_field(out: &mut Vec<FieldViolation>, field: QuizField, value: &str) {
    if value.trim().is_empty() {
        out.push(FieldViolation {
            field,
            message: format!("the {field} must not be empty"),
        });
    }
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
