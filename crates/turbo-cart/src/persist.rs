//! Background persistence of cart snapshots.
//!
//! Mutations never wait on storage. Each one hands the serialized
//! post-mutation snapshot to a [`Persister`], which writes it to the
//! Key-Value store from a background task according to the configured
//! [`WriteMode`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument, Span};
use turbo_cache::KeyValueStore;

use crate::config::WriteMode;

/// Persistence counters for one cart session.
///
/// Once all scheduled writes have settled,
/// `scheduled == completed + failed + coalesced`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    /// Snapshots handed to the writer.
    pub scheduled: u64,
    /// Snapshots the store acknowledged.
    pub completed: u64,
    /// Snapshots the store rejected.
    pub failed: u64,
    /// Snapshots superseded by a newer one before they were written.
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct Counters {
    scheduled: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    coalesced: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WriteStats {
        WriteStats {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

enum Command {
    Write(String),
    Flush(oneshot::Sender<()>),
}

enum Dispatch {
    Queued(mpsc::UnboundedSender<Command>),
    Detached(Mutex<Vec<JoinHandle<()>>>),
}

/// Issues `set` calls for cart snapshots.
pub(crate) struct Persister {
    store: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    counters: Arc<Counters>,
    span: Span,
    dispatch: Dispatch,
}

impl Persister {
    /// Create a persister; in queued mode this spawns the writer task, so it
    /// must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: &str,
        mode: WriteMode,
        span: Span,
    ) -> Self {
        let key: Arc<str> = Arc::from(key);
        let counters = Arc::new(Counters::default());

        let dispatch = match mode {
            WriteMode::Queued => {
                let (tx, rx) = mpsc::unbounded_channel();
                tokio::spawn(
                    run_writer(Arc::clone(&store), Arc::clone(&key), Arc::clone(&counters), rx)
                        .instrument(span.clone()),
                );
                Dispatch::Queued(tx)
            }
            WriteMode::Detached => Dispatch::Detached(Mutex::new(Vec::new())),
        };

        Self {
            store,
            key,
            counters,
            span,
            dispatch,
        }
    }

    /// Schedule `payload` to be written. Never blocks.
    pub(crate) fn schedule(&self, payload: String) {
        self.counters.scheduled.fetch_add(1, Ordering::Relaxed);

        match &self.dispatch {
            Dispatch::Queued(tx) => {
                if tx.send(Command::Write(payload)).is_err() {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        parent: &self.span,
                        key = %self.key,
                        "cart writer stopped, snapshot dropped"
                    );
                }
            }
            Dispatch::Detached(tasks) => {
                let store = Arc::clone(&self.store);
                let key = Arc::clone(&self.key);
                let counters = Arc::clone(&self.counters);
                let handle = tokio::spawn(
                    async move { write_snapshot(&*store, &key, payload, &counters).await }
                        .instrument(self.span.clone()),
                );

                let mut tasks = tasks.lock().unwrap_or_else(PoisonError::into_inner);
                tasks.retain(|t| !t.is_finished());
                tasks.push(handle);
            }
        }
    }

    /// Wait until every write scheduled before this call has settled.
    pub(crate) async fn flush(&self) {
        match &self.dispatch {
            Dispatch::Queued(tx) => {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(Command::Flush(done_tx)).is_ok() {
                    let _ = done_rx.await;
                }
            }
            Dispatch::Detached(tasks) => {
                let pending = {
                    let mut tasks = tasks.lock().unwrap_or_else(PoisonError::into_inner);
                    std::mem::take(&mut *tasks)
                };
                for task in pending {
                    if let Err(e) = task.await {
                        warn!(
                            parent: &self.span,
                            key = %self.key,
                            error = %e,
                            "cart write task aborted"
                        );
                    }
                }
            }
        }
    }

    pub(crate) fn stats(&self) -> WriteStats {
        self.counters.snapshot()
    }
}

/// Single writer: applies snapshots in the order they were scheduled.
async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    counters: Arc<Counters>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        let mut payload = match command {
            Command::Write(payload) => payload,
            Command::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        // Only the newest queued snapshot needs to reach the store.
        let mut waiting = Vec::new();
        while let Ok(next) = rx.try_recv() {
            match next {
                Command::Write(newer) => {
                    counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    payload = newer;
                }
                Command::Flush(done) => waiting.push(done),
            }
        }

        write_snapshot(&*store, &key, payload, &counters).await;

        for done in waiting {
            let _ = done.send(());
        }
    }

    debug!(key = %key, "cart writer stopped");
}

async fn write_snapshot(
    store: &dyn KeyValueStore,
    key: &str,
    payload: String,
    counters: &Counters,
) {
    let bytes = payload.len();
    match store.set(key, payload).await {
        Ok(()) => {
            counters.completed.fetch_add(1, Ordering::Relaxed);
            debug!(key, bytes, "cart snapshot persisted");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(key, error = %e, "cart snapshot not persisted");
        }
    }
}
