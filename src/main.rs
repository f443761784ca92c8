use anyhow::Context;
use clap::Parser;

use quizdrill::{
    config::AppConfig,
    core::store::QuizStore,
    persist::{OpSink, sqlite::SqliteOpSink},
    runtime::handle::spawn_quiz_store,
    session::{SessionEngine, repl},
    terminal::TerminalSurface,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizdrill=warn")),
        )
        .init();

    let cfg = AppConfig::parse();

    let (store, sink): (QuizStore, Option<Box<dyn OpSink>>) = if cfg.in_memory {
        (QuizStore::new(), None)
    } else {
        let sink = SqliteOpSink::open(&cfg.db)
            .with_context(|| format!("opening quiz journal {}", cfg.db.display()))?;
        let store = sink
            .load_store()
            .with_context(|| format!("replaying quiz journal {}", cfg.db.display()))?;
        let sink: Box<dyn OpSink> = Box::new(sink);
        (store, Some(sink))
    };
    tracing::info!(quizzes = store.len(), in_memory = cfg.in_memory, "quiz store loaded");

    let handle = spawn_quiz_store(store, sink, cfg.runtime());
    let mut engine = match cfg.seed {
        Some(seed) => SessionEngine::with_seed(handle.clone(), seed),
        None => SessionEngine::new(handle.clone()),
    };

    let mut surface = TerminalSurface::new();
    let session = repl::run(&mut engine, &mut surface).await;

    handle.shutdown().await.context("flushing quiz journal")?;
    session.context("reading commands")?;
    Ok(())
}
