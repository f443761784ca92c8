//! Interactive quiz trainer: an in-memory quiz store journaled to SQLite, and a
//! session engine that lists, shows, adds, edits, deletes, tests and plays quizzes
//! over a line-oriented surface.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::QuizStore`]:
//! ```
//! use quizdrill::{core::store::QuizStore, quiz::QuizDraft};
//!
//! let mut store = QuizStore::new();
//! let (quiz, _op) = store.create(QuizDraft::new("2+2?", "4")).expect("create");
//! assert_eq!(quiz.id, 1);
//! ```
//!
//! Running a session against the store runtime with a SQLite journal:
//! ```no_run
//! use quizdrill::{
//!     persist::sqlite::SqliteOpSink,
//!     runtime::handle::{RuntimeConfig, spawn_quiz_store},
//!     session::{SessionEngine, repl},
//!     terminal::TerminalSurface,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteOpSink::open("quizzes.db").expect("open sqlite");
//! let store = sink.load_store().expect("replay");
//! let handle = spawn_quiz_store(store, Some(Box::new(sink)), RuntimeConfig::default());
//! let mut engine = SessionEngine::new(handle.clone());
//! repl::run(&mut engine, &mut TerminalSurface::new()).await.expect("session");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Command-line configuration.
pub mod config;
/// Core in-memory quiz store.
pub mod core;
/// Mutation op model and persistence wrapper types.
pub mod op;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Quiz domain records, patches and validation.
pub mod quiz;
/// Single-writer store runtime handle and events.
pub mod runtime;
/// Interactive session engine.
pub mod session;
/// Terminal line surface.
pub mod terminal;
/// Shared primitive types.
pub mod types;
