use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, mpsc::OwnedPermit, oneshot},
    time::{Duration, Instant},
};

use crate::{
    core::store::{QuizStore, StoreError, StoreSnapshotV1},
    op::StoredOp,
    persist::{OpSink, PersistError},
    quiz::{QuizDraft, QuizPatch, QuizRecord},
    types::{OpSeq, QuizId},
};

use super::events::QuizEvent;

/// Failures surfaced by [`QuizStoreHandle`] calls.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The journal could not accept or write the op.
    #[error("persistence failed: {0}")]
    Persist(#[from] PersistError),
    /// The store task is gone.
    #[error("quiz store is shut down")]
    ChannelClosed,
}

/// Tuning for the store task and its persistence worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Flush the journal right after every create.
    pub flush_on_create: bool,
    /// Flush once this many ops are buffered.
    pub batch_max_ops: usize,
    /// Flush buffered ops after this much idle latency.
    pub batch_max_latency_ms: u64,
    /// Capacity of the queue feeding the persistence worker. Mutations wait while it is full.
    pub persist_queue_bound: usize,
    /// Write a snapshot every N mutations; 0 disables.
    pub snapshot_every_ops: usize,
    /// Delete journal rows covered by a fresh snapshot.
    pub compact_after_snapshot: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_create: true,
            batch_max_ops: 32,
            batch_max_latency_ms: 75,
            persist_queue_bound: 64,
            snapshot_every_ops: 500,
            compact_after_snapshot: true,
        }
    }
}

/// Cloneable async front door to the single-writer quiz store.
#[derive(Clone)]
pub struct QuizStoreHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<QuizEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    Create { draft: QuizDraft, resp: Reply<QuizRecord> },
    Update { id: QuizId, patch: QuizPatch, resp: Reply<QuizRecord> },
    Destroy { id: QuizId, resp: Reply<usize> },
    Get { id: QuizId, resp: Reply<Option<QuizRecord>> },
    All { resp: Reply<Vec<QuizRecord>> },
    Flush { resp: Reply<OpSeq> },
    Checkpoint { resp: Reply<()> },
    Shutdown { resp: Reply<()> },
}

enum PersistMsg {
    Op(StoredOp),
    Flush {
        resp: oneshot::Sender<Result<OpSeq, PersistError>>,
    },
    Checkpoint {
        snapshot: StoreSnapshotV1,
        last_seq: OpSeq,
        compact: bool,
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

enum Wake {
    Command(Option<Command>),
    Durable(Option<Result<OpSeq, PersistError>>),
}

struct StoreTask {
    store: QuizStore,
    events_tx: broadcast::Sender<QuizEvent>,
    persist_tx: Option<mpsc::Sender<PersistMsg>>,
    config: RuntimeConfig,
    ops_since_snapshot: usize,
}

/// Moves `store` into a dedicated task and returns a handle to it.
///
/// With a `sink`, every mutation is journaled by a background worker that batches
/// ops by count and latency. Without one, ops are durable as soon as they apply.
pub fn spawn_quiz_store(
    store: QuizStore,
    sink: Option<Box<dyn OpSink>>,
    config: RuntimeConfig,
) -> QuizStoreHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(64);
    let (events_tx, _) = broadcast::channel::<QuizEvent>(256);

    let (persist_tx, mut durable_rx) = if let Some(sink) = sink {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound);
        let (durable_tx, durable_rx) = mpsc::unbounded_channel::<Result<OpSeq, PersistError>>();
        spawn_persistence_worker(sink, persist_rx, durable_tx, config.clone());
        (Some(persist_tx), Some(durable_rx))
    } else {
        (None, None)
    };

    let mut state = StoreTask {
        store,
        events_tx: events_tx.clone(),
        persist_tx,
        config,
        ops_since_snapshot: 0,
    };

    tokio::spawn(async move {
        loop {
            let wake = match durable_rx.as_mut() {
                Some(rx) => tokio::select! {
                    cmd = cmd_rx.recv() => Wake::Command(cmd),
                    durable = rx.recv() => Wake::Durable(durable),
                },
                None => Wake::Command(cmd_rx.recv().await),
            };

            match wake {
                Wake::Command(Some(cmd)) => {
                    if state.handle(cmd).await {
                        break;
                    }
                }
                Wake::Command(None) => break,
                Wake::Durable(Some(Ok(op_seq))) => {
                    let _ = state.events_tx.send(QuizEvent::DurableUpTo { op_seq });
                }
                Wake::Durable(Some(Err(err))) => tracing::warn!("quiz journal write failed: {err}"),
                Wake::Durable(None) => durable_rx = None,
            }
        }
        tracing::debug!("quiz store task stopped");
    });

    QuizStoreHandle { cmd_tx, events_tx }
}

impl QuizStoreHandle {
    /// Subscribes to mutation and durability events.
    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.events_tx.subscribe()
    }

    /// Validates and stores a new quiz.
    pub async fn create(&self, draft: QuizDraft) -> Result<QuizRecord, RuntimeError> {
        self.request(|resp| Command::Create { draft, resp }).await
    }

    /// Overwrites the fields set in `patch`.
    pub async fn update(&self, id: QuizId, patch: QuizPatch) -> Result<QuizRecord, RuntimeError> {
        self.request(|resp| Command::Update { id, patch, resp }).await
    }

    /// Removes `id`, returning how many records went away (0 or 1).
    pub async fn destroy(&self, id: QuizId) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Destroy { id, resp }).await
    }

    /// Looks up one quiz.
    pub async fn get(&self, id: QuizId) -> Result<Option<QuizRecord>, RuntimeError> {
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// All quizzes in insertion order.
    pub async fn all(&self) -> Result<Vec<QuizRecord>, RuntimeError> {
        self.request(|resp| Command::All { resp }).await
    }

    /// Waits until every applied op is durable; returns the durable sequence.
    pub async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        self.request(|resp| Command::Flush { resp }).await
    }

    /// Writes a snapshot of the current store.
    pub async fn checkpoint(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Checkpoint { resp }).await
    }

    /// Flushes the journal and stops the store task.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

impl StoreTask {
    /// Returns true when the loop should stop.
    async fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Create { draft, resp } => {
                let res = match self.reserve_journal_slot().await {
                    Ok(slot) => self
                        .store
                        .create(draft)
                        .map_err(RuntimeError::from)
                        .map(|(quiz, stored)| {
                            self.commit(slot, stored, QuizEvent::Created { id: quiz.id });
                            quiz
                        }),
                    Err(err) => Err(err),
                };
                if res.is_ok() {
                    self.maybe_auto_checkpoint().await;
                }
                let _ = resp.send(res);
            }
            Command::Update { id, patch, resp } => {
                let res = match self.reserve_journal_slot().await {
                    Ok(slot) => self
                        .store
                        .update(id, patch)
                        .map_err(RuntimeError::from)
                        .map(|(quiz, stored)| {
                            self.commit(slot, stored, QuizEvent::Updated { id });
                            quiz
                        }),
                    Err(err) => Err(err),
                };
                if res.is_ok() {
                    self.maybe_auto_checkpoint().await;
                }
                let _ = resp.send(res);
            }
            Command::Destroy { id, resp } => {
                let res = match self.reserve_journal_slot().await {
                    Ok(slot) => match self.store.destroy(id) {
                        (count, Some(stored)) => {
                            self.commit(slot, stored, QuizEvent::Deleted { id });
                            Ok(count)
                        }
                        (count, None) => Ok(count),
                    },
                    Err(err) => Err(err),
                };
                let _ = resp.send(res);
            }
            Command::Get { id, resp } => {
                let _ = resp.send(Ok(self.store.get_cloned(id)));
            }
            Command::All { resp } => {
                let _ = resp.send(Ok(self.store.all_cloned()));
            }
            Command::Flush { resp } => {
                let out = match &self.persist_tx {
                    Some(tx) => {
                        let (flush_tx, flush_rx) = oneshot::channel();
                        round_trip(tx, PersistMsg::Flush { resp: flush_tx }, flush_rx).await
                    }
                    None => Ok(self.store.latest_op_seq()),
                };
                let _ = resp.send(out);
            }
            Command::Checkpoint { resp } => {
                let _ = resp.send(self.checkpoint().await);
            }
            Command::Shutdown { resp } => {
                let out = match &self.persist_tx {
                    Some(tx) => {
                        let (done_tx, done_rx) = oneshot::channel();
                        if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                            Err(RuntimeError::ChannelClosed)
                        } else {
                            done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                        }
                    }
                    None => Ok(()),
                };
                let _ = resp.send(out);
                return true;
            }
        }

        false
    }

    /// Waits for room in the persistence queue. Taken before a mutation is applied, so
    /// an applied op always reaches the journal.
    async fn reserve_journal_slot(&self) -> Result<Option<OwnedPermit<PersistMsg>>, RuntimeError> {
        match &self.persist_tx {
            Some(tx) => tx
                .clone()
                .reserve_owned()
                .await
                .map(Some)
                .map_err(|_| RuntimeError::ChannelClosed),
            None => Ok(None),
        }
    }

    fn commit(&mut self, slot: Option<OwnedPermit<PersistMsg>>, stored: StoredOp, event: QuizEvent) {
        // The worker journals `stored`; the pending buffer only serves hand-driven sinks.
        self.store.drain_pending_ops();
        tracing::debug!(seq = stored.seq, ?event, "quiz store mutation");
        match slot {
            Some(slot) => {
                slot.send(PersistMsg::Op(stored));
            }
            None => {
                let _ = self.events_tx.send(QuizEvent::DurableUpTo {
                    op_seq: self.store.latest_op_seq(),
                });
            }
        }
        let _ = self.events_tx.send(event);
        self.ops_since_snapshot += 1;
    }

    async fn checkpoint(&mut self) -> Result<(), RuntimeError> {
        let Some(tx) = &self.persist_tx else {
            return Ok(());
        };
        let (cp_tx, cp_rx) = oneshot::channel();
        let msg = PersistMsg::Checkpoint {
            snapshot: self.store.export_snapshot(),
            last_seq: self.store.latest_op_seq(),
            compact: self.config.compact_after_snapshot,
            resp: cp_tx,
        };
        round_trip(tx, msg, cp_rx).await?;
        self.ops_since_snapshot = 0;
        Ok(())
    }

    async fn maybe_auto_checkpoint(&mut self) {
        let every = self.config.snapshot_every_ops;
        if every == 0 || self.ops_since_snapshot < every {
            return;
        }
        if let Err(err) = self.checkpoint().await {
            tracing::warn!("automatic quiz snapshot failed: {err}");
        }
    }
}

async fn round_trip<T>(
    tx: &mpsc::Sender<PersistMsg>,
    msg: PersistMsg,
    rx: oneshot::Receiver<Result<T, PersistError>>,
) -> Result<T, RuntimeError> {
    if tx.send(msg).await.is_err() {
        return Err(RuntimeError::ChannelClosed);
    }
    rx.await
        .map_err(|_| RuntimeError::ChannelClosed)?
        .map_err(RuntimeError::from)
}

fn spawn_persistence_worker(
    sink: Box<dyn OpSink>,
    mut rx: mpsc::Receiver<PersistMsg>,
    durable_tx: mpsc::UnboundedSender<Result<OpSeq, PersistError>>,
    config: RuntimeConfig,
) {
    let sink = Arc::new(Mutex::new(sink));
    tokio::spawn(async move {
        let latency = Duration::from_millis(config.batch_max_latency_ms);
        let mut buf = Vec::<StoredOp>::new();
        let mut deadline = Instant::now() + latency;
        let mut last_durable: OpSeq = 0;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Op(stored) => {
                            let is_create = matches!(stored.op, crate::op::Op::Insert { .. });
                            buf.push(stored);

                            if buf.len() >= config.batch_max_ops || (config.flush_on_create && is_create) {
                                let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                                deadline = Instant::now() + latency;
                            }
                        }
                        PersistMsg::Flush { resp } => {
                            let result = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                            let _ = resp.send(result.map(|_| last_durable));
                            deadline = Instant::now() + latency;
                        }
                        PersistMsg::Checkpoint { snapshot, last_seq, compact, resp } => {
                            let result = match flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await {
                                Err(err) => Err(err),
                                Ok(()) => {
                                    let sink_ref = Arc::clone(&sink);
                                    blocking(move || {
                                        let mut sink = sink_ref.blocking_lock();
                                        let removed = sink.checkpoint(&snapshot, last_seq, compact)?;
                                        tracing::debug!(last_seq, removed, "quiz store checkpointed");
                                        Ok(())
                                    })
                                    .await
                                }
                            };
                            let _ = resp.send(result);
                            deadline = Instant::now() + latency;
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if !buf.is_empty() => {
                    let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, false).await;
                    deadline = Instant::now() + latency;
                }
            }
        }
    });
}

async fn blocking<T: Send + 'static>(
    f: impl FnOnce() -> Result<T, PersistError> + Send + 'static,
) -> Result<T, PersistError> {
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PersistError::Message(format!("join error: {e}")))?
}

async fn flush_buf(
    sink: &Arc<Mutex<Box<dyn OpSink>>>,
    buf: &mut Vec<StoredOp>,
    last_durable: &mut OpSeq,
    durable_tx: &mpsc::UnboundedSender<Result<OpSeq, PersistError>>,
    call_flush: bool,
) -> Result<(), PersistError> {
    let sink_ref = Arc::clone(sink);
    if buf.is_empty() {
        if call_flush {
            blocking(move || sink_ref.blocking_lock().flush()).await?;
        }
        return Ok(());
    }

    let ops = std::mem::take(buf);
    let append_res = blocking(move || {
        let mut sink = sink_ref.blocking_lock();
        let seq = sink.append_ops(&ops)?;
        if call_flush {
            sink.flush()?;
        }
        Ok(seq)
    })
    .await;

    match append_res {
        Ok(seq) => {
            *last_durable = (*last_durable).max(seq);
            let _ = durable_tx.send(Ok(*last_durable));
            Ok(())
        }
        Err(err) => {
            let _ = durable_tx.send(Err(PersistError::Message(format!("append failed: {err}"))));
            Err(err)
        }
    }
}
