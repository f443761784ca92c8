//! Randomized quiz round: every stored quiz at most once, until the first miss.

use rand::Rng;

use crate::{quiz::QuizRecord, types::QuizId};

use super::{
    engine::SessionEngine,
    error::SessionError,
    protocol::{LineSurface, Report, Verdict, ask},
    store::RecordStore,
};

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayEnd {
    /// Every quiz was answered correctly.
    Exhausted,
    /// The user missed one.
    Incorrect,
}

/// Result of one `play` round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Correct answers given.
    pub score: u32,
    /// Quiz ids in the order they were asked.
    pub asked: Vec<QuizId>,
    /// Why the round stopped.
    pub end: PlayEnd,
}

struct SessionState {
    score: u32,
    remaining: Vec<QuizRecord>,
}

impl SessionState {
    fn draw(&mut self, rng: &mut impl Rng) -> Option<QuizRecord> {
        if self.remaining.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(idx))
    }
}

impl<S: RecordStore> SessionEngine<S> {
    /// Asks stored quizzes in uniformly random order without repeats.
    ///
    /// Each correct answer bumps and reports the score. The first wrong answer ends the
    /// round without revealing the expected answer; running out of quizzes reports the
    /// final score. Store and input failures end the round with no score line.
    pub async fn play<L: LineSurface + ?Sized>(&mut self, surface: &mut L) -> Result<PlayOutcome, SessionError> {
        let mut state = SessionState {
            score: 0,
            remaining: self.store.find_all().await?,
        };
        let mut asked = Vec::with_capacity(state.remaining.len());

        while let Some(quiz) = state.draw(&mut self.rng) {
            asked.push(quiz.id);
            let answer = ask(surface, &quiz.question).await?;
            match Verdict::judge(&answer, &quiz.answer) {
                Verdict::Correct => {
                    state.score += 1;
                    surface.report(Report::Verdict(Verdict::Correct));
                    surface.report(Report::Score(state.score));
                }
                Verdict::Incorrect => {
                    surface.report(Report::Verdict(Verdict::Incorrect));
                    return Ok(PlayOutcome {
                        score: state.score,
                        asked,
                        end: PlayEnd::Incorrect,
                    });
                }
            }
        }

        surface.report(Report::FinalScore(state.score));
        Ok(PlayOutcome {
            score: state.score,
            asked,
            end: PlayEnd::Exhausted,
        })
    }
}
