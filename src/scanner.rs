use std::future::poll_fn;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;

use crate::engine::{ScanEvent, ScanSession};
use crate::results::{BatchId, ScanSnapshot};

/// Runs scan sessions in real time on the Tokio runtime.
///
/// Each batch gets one owner task that holds the [`ScanSession`] and a
/// `DelayQueue` of pending transitions; the task is the only thing that
/// ever mutates the batch. Observers read [`ScanSnapshot`]s from a watch
/// channel.
///
/// Starting a new batch supersedes the current one: its owner task is
/// cancelled, which drops every timer it still held, and any snapshot it
/// tries to publish afterwards is rejected because the batch id no longer
/// matches. A plain [`cancel`](Self::cancel) gates publication on the
/// cancellation token instead.
pub struct Scanner {
    snapshots: Arc<watch::Sender<ScanSnapshot>>,
    next_batch: u64,
    current: Option<Running>,
}

struct Running {
    batch: BatchId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// An idle scanner publishing an empty snapshot.
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(ScanSnapshot::default());
        Self {
            snapshots: Arc::new(snapshots),
            next_batch: 0,
            current: None,
        }
    }

    /// Watch the snapshots of whichever batch is current.
    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.snapshots.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ScanSnapshot {
        self.snapshots.borrow().clone()
    }

    /// The batch started last, unless it was cancelled.
    pub fn current_batch(&self) -> Option<BatchId> {
        self.current.as_ref().map(|r| r.batch)
    }

    /// Whether the current batch's owner task is still alive.
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|r| !r.task.is_finished())
    }

    /// Start a batch, superseding the current one.
    ///
    /// Must be called from within a Tokio runtime. By the time this
    /// returns, the published snapshot belongs to the new batch.
    pub fn start(&mut self, mut session: ScanSession) -> BatchId {
        if let Some(previous) = self.stop() {
            tracing::info!(batch = previous.0, "scan batch superseded");
        }

        self.next_batch += 1;
        let batch = BatchId(self.next_batch);
        session.set_batch(batch);

        self.snapshots.send_replace(session.snapshot());

        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(session, Arc::clone(&self.snapshots), cancel.clone()));
        self.current = Some(Running {
            batch,
            cancel,
            task,
        });
        batch
    }

    /// Stop the current batch. Its last published snapshot stays visible:
    /// once this returns, nothing is published for the batch again.
    pub fn cancel(&mut self) {
        if let Some(batch) = self.stop() {
            tracing::info!(batch = batch.0, "scan batch cancelled");
        }
    }

    fn stop(&mut self) -> Option<BatchId> {
        let running = self.current.take()?;
        running.cancel.cancel();
        running.task.abort();
        // Wait out a publication already holding the lock; later ones see
        // the token.
        self.snapshots.send_if_modified(|_| false);
        Some(running.batch)
    }

    /// Wait until the current batch has finished and return its final
    /// snapshot. `None` when no batch is running.
    pub async fn finished(&self) -> Option<ScanSnapshot> {
        let batch = self.current_batch()?;
        let mut rx = self.subscribe();
        let snapshot = rx
            .wait_for(|s| s.batch == batch && s.is_finished())
            .await
            .ok()
            .map(|s| (*s).clone());
        snapshot
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        if let Some(batch) = self.stop() {
            tracing::debug!(batch = batch.0, "scanner dropped, batch stopped");
        }
    }
}

/// Owner task of one batch.
async fn drive(
    mut session: ScanSession,
    snapshots: Arc<watch::Sender<ScanSnapshot>>,
    cancel: CancellationToken,
) {
    let batch = session.batch();
    let mut timers: DelayQueue<ScanEvent> = DelayQueue::new();
    for item in session.start() {
        timers.insert(item.event, item.after);
    }

    loop {
        let expired = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(batch = batch.0, timers = timers.len(), "owner task cancelled");
                return;
            }
            expired = poll_fn(|cx| timers.poll_expired(cx)) => expired,
        };

        // An empty queue means nothing is left to reveal or resolve.
        let Some(expired) = expired else { break };

        for item in session.apply(expired.into_inner()) {
            timers.insert(item.event, item.after);
        }

        let published = snapshots.send_if_modified(|current| {
            if current.batch != batch || cancel.is_cancelled() {
                return false;
            }
            *current = session.snapshot();
            true
        });
        if !published {
            tracing::debug!(batch = batch.0, "batch stopped, owner task exiting");
            return;
        }
    }

    tracing::debug!(batch = batch.0, "owner task finished");
}
