use rand::{SeedableRng, rngs::StdRng};

use crate::quiz::{QuizDraft, QuizPatch, QuizRecord};

use super::{
    command::Command,
    error::SessionError,
    protocol::{LineSurface, Report, Verdict, ask},
    store::RecordStore,
    validate::validate_id,
};

const QUESTION_PROMPT: &str = "Enter a question: ";
const ANSWER_PROMPT: &str = "Enter the answer: ";

/// What the read loop should do after a command settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop reading; the user quit or the input closed.
    Quit,
}

/// Runs user commands against a [`RecordStore`], one at a time.
pub struct SessionEngine<S> {
    pub(super) store: S,
    pub(super) rng: StdRng,
}

impl<S: RecordStore> SessionEngine<S> {
    /// Engine with an OS-seeded random source.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Engine whose `play` order is reproducible for a given `seed`.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self {
            store,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The store this engine talks to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parses and runs one input line, reporting any failure, then signals ready.
    ///
    /// Only `quit` and a closed surface end the session.
    pub async fn dispatch<L: LineSurface + ?Sized>(&mut self, surface: &mut L, line: &str) -> Flow {
        let result = match Command::parse(line) {
            Ok(cmd) => {
                tracing::debug!(?cmd, "dispatching command");
                self.run(surface, cmd).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(Flow::Quit) | Err(SessionError::Closed) => return Flow::Quit,
            Ok(Flow::Continue) => {}
            Err(err) => {
                tracing::debug!("command failed: {err}");
                for line in err.report_lines() {
                    surface.report(Report::Error(line));
                }
            }
        }
        surface.ready();
        Flow::Continue
    }

    async fn run<L: LineSurface + ?Sized>(&mut self, surface: &mut L, cmd: Command) -> Result<Flow, SessionError> {
        match cmd {
            Command::Empty => {}
            Command::Help => surface.report(Report::Help),
            Command::Credits => surface.report(Report::Credits),
            Command::List => {
                self.list(surface).await?;
            }
            Command::Show(arg) => {
                self.show(surface, arg.as_deref()).await?;
            }
            Command::Test(arg) => {
                self.test(surface, arg.as_deref()).await?;
            }
            Command::Add => {
                self.add(surface).await?;
            }
            Command::Delete(arg) => {
                self.delete(arg.as_deref()).await?;
            }
            Command::Edit(arg) => {
                self.edit(surface, arg.as_deref()).await?;
            }
            Command::Play => {
                self.play(surface).await?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Reports every quiz in store order; returns how many were listed.
    pub async fn list<L: LineSurface + ?Sized>(&self, surface: &mut L) -> Result<usize, SessionError> {
        let quizzes = self.store.find_all().await?;
        let count = quizzes.len();
        for quiz in quizzes {
            surface.report(Report::Listed(quiz));
        }
        Ok(count)
    }

    /// Reports the question and answer of quiz `<id>`.
    pub async fn show<L: LineSurface + ?Sized>(
        &self,
        surface: &mut L,
        arg: Option<&str>,
    ) -> Result<QuizRecord, SessionError> {
        let quiz = self.find(arg).await?;
        surface.report(Report::Shown(quiz.clone()));
        Ok(quiz)
    }

    /// Asks quiz `<id>` once and reports whether the answer matched.
    pub async fn test<L: LineSurface + ?Sized>(
        &self,
        surface: &mut L,
        arg: Option<&str>,
    ) -> Result<Verdict, SessionError> {
        let quiz = self.find(arg).await?;
        let answer = ask(surface, &quiz.question).await?;
        let verdict = Verdict::judge(&answer, &quiz.answer);
        surface.report(Report::Verdict(verdict));
        Ok(verdict)
    }

    /// Asks for a question and an answer, then stores them as a new quiz.
    pub async fn add<L: LineSurface + ?Sized>(&self, surface: &mut L) -> Result<QuizRecord, SessionError> {
        let question = ask(surface, QUESTION_PROMPT).await?;
        let answer = ask(surface, ANSWER_PROMPT).await?;
        let quiz = self.store.create(QuizDraft::new(question, answer)).await?;
        surface.report(Report::Added(quiz.clone()));
        Ok(quiz)
    }

    /// Deletes quiz `<id>`; a missing id deletes nothing and is not an error.
    pub async fn delete(&self, arg: Option<&str>) -> Result<usize, SessionError> {
        let id = validate_id(arg)?;
        Ok(self.store.destroy(id).await?)
    }

    /// Replaces the question and answer of quiz `<id>`, offering the current text first.
    pub async fn edit<L: LineSurface + ?Sized>(
        &self,
        surface: &mut L,
        arg: Option<&str>,
    ) -> Result<QuizRecord, SessionError> {
        let quiz = self.find(arg).await?;

        surface.prefill(&quiz.question);
        let question = ask(surface, QUESTION_PROMPT).await?;
        surface.prefill(&quiz.answer);
        let answer = ask(surface, ANSWER_PROMPT).await?;

        let patch = QuizPatch {
            question: Some(question),
            answer: Some(answer),
        };
        let updated = self.store.update(quiz.id, patch).await?;
        surface.report(Report::Edited(updated.clone()));
        Ok(updated)
    }

    async fn find(&self, arg: Option<&str>) -> Result<QuizRecord, SessionError> {
        let id = validate_id(arg)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(SessionError::NotFound(id))
    }
}
