//! Interactive session engine: argument validation, question/answer protocol,
//! per-command pipelines and the randomized play loop.

/// Input line parsing.
pub mod command;
/// Command orchestration.
pub mod engine;
/// Session error taxonomy.
pub mod error;
/// Randomized play round.
pub mod play;
/// Question/answer protocol and the line surface contract.
pub mod protocol;
/// Command read loop.
pub mod repl;
/// Record store contract.
pub mod store;
/// `<id>` argument validation.
pub mod validate;

pub use command::Command;
pub use engine::{Flow, SessionEngine};
pub use error::SessionError;
pub use play::{PlayEnd, PlayOutcome};
pub use protocol::{LineSurface, Report, Verdict, answers_match, ask};
pub use store::RecordStore;
pub use validate::validate_id;
