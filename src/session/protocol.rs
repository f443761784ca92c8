use std::io;

use async_trait::async_trait;

use crate::quiz::QuizRecord;

use super::error::SessionError;

/// Everything the engine tells the user, rendered by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The command list.
    Help,
    /// Author lines.
    Credits,
    /// One `list` row.
    Listed(QuizRecord),
    /// `show` output: question and answer.
    Shown(QuizRecord),
    /// Outcome of one asked question.
    Verdict(Verdict),
    /// Running score after a correct answer in `play`.
    Score(u32),
    /// Score once every quiz has been asked.
    FinalScore(u32),
    /// A quiz was stored by `add`.
    Added(QuizRecord),
    /// A quiz was rewritten by `edit`.
    Edited(QuizRecord),
    /// One error line.
    Error(String),
}

/// Whether an answer matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Answer matched the stored one.
    Correct,
    /// Answer did not match.
    Incorrect,
}

impl Verdict {
    /// Compares `given` with `expected` using [`answers_match`].
    pub fn judge(given: &str, expected: &str) -> Self {
        if answers_match(given, expected) {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// Line-oriented user interaction: prompts, single-line answers and report output.
///
/// Exactly one `read_line` is outstanding at a time.
#[async_trait]
pub trait LineSurface: Send {
    /// Shows `prompt` and waits for one line. `Ok(None)` means the input was closed.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Offers `text` as the initial content of the next `read_line`. Best-effort.
    fn prefill(&mut self, _text: &str) {}

    /// Renders one report.
    fn report(&mut self, report: Report);

    /// Signals that the previous command has fully settled.
    fn ready(&mut self) {}
}

/// Asks one question and returns the trimmed answer.
///
/// Empty answers are returned as-is; a closed surface is [`SessionError::Closed`].
pub async fn ask<S: LineSurface + ?Sized>(surface: &mut S, prompt: &str) -> Result<String, SessionError> {
    match surface.read_line(prompt).await? {
        Some(line) => Ok(line.trim().to_string()),
        None => Err(SessionError::Closed),
    }
}

/// Trimmed, case-insensitive answer equality.
pub fn answers_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
