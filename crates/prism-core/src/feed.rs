//! Serialized delivery of engine diff batches into a projection.
//!
//! The engine hands over batches of [`DiffOp`]s through an unbounded channel.
//! [`spawn_feed`] drains that channel on a single task and applies each batch
//! under the projection's lock, which gives the single-writer, in-order
//! guarantee regardless of how many threads the runtime uses.
//!
//! Desync violations never stop the feed. They are logged, reported on the
//! optional side channel as a [`DesyncReport`], and the remainder of the
//! offending batch is skipped. The owner decides whether to ask the engine
//! for a resync.

use std::sync::Arc;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{BatchDesync, DesyncError, DiffOp};

/// Ordered group of operations delivered together by the engine.
pub type DiffBatch<T> = Vec<DiffOp<T>>;

/// A collection that accepts diff operations.
pub trait ApplyDiff {
    /// Item type carried by the operations.
    type Item;

    /// Apply one operation.
    ///
    /// # Errors
    ///
    /// Returns [`DesyncError`] and leaves the collection untouched if the
    /// operation references a position that does not exist.
    fn apply(&mut self, op: DiffOp<Self::Item>) -> Result<(), DesyncError>;

    /// Apply a batch in order, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`BatchDesync`] describing how many operations were applied
    /// before the failure and how many were skipped after it.
    fn apply_batch(&mut self, batch: DiffBatch<Self::Item>) -> Result<usize, BatchDesync> {
        let total = batch.len();
        for (applied, op) in batch.into_iter().enumerate() {
            if let Err(source) = self.apply(op) {
                return Err(BatchDesync { applied, skipped: total - applied - 1, source });
            }
        }
        Ok(total)
    }
}

/// Desync observed by a running feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesyncReport {
    /// Label of the collection the feed drives (room id, "room_list", ...).
    pub collection: String,
    /// What went wrong.
    pub desync: BatchDesync,
}

/// Handle to a running feed task.
///
/// Dropping the handle stops the feed. Batches still queued at that point are
/// never applied.
#[derive(Debug)]
pub struct FeedHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Stop the feed. No batch is applied after this returns.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the feed task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token cancelled when the feed stops.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a task applying `batches` to `target` in arrival order.
///
/// The feed stops when `parent` is cancelled, when the returned handle is
/// stopped or dropped, or when the engine closes its sending half. The lock
/// is re-checked against cancellation after it is acquired, so a batch never
/// lands on a projection whose owner already shut it down.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_feed<P>(
    collection: impl Into<String>,
    target: Arc<Mutex<P>>,
    mut batches: mpsc::UnboundedReceiver<DiffBatch<P::Item>>,
    reports: Option<mpsc::UnboundedSender<DesyncReport>>,
    parent: &CancellationToken,
) -> FeedHandle
where
    P: ApplyDiff + Send + 'static,
    P::Item: Send + 'static,
{
    let collection = collection.into();
    let cancel = parent.child_token();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        loop {
            let batch = tokio::select! {
                biased;
                () = token.cancelled() => break,
                batch = batches.recv() => match batch {
                    Some(batch) => batch,
                    None => break,
                },
            };

            let mut guard = target.lock().await;
            if token.is_cancelled() {
                break;
            }

            let ops = batch.len();
            match guard.apply_batch(batch) {
                Ok(applied) => {
                    tracing::debug!(%collection, ops, applied, "applied diff batch");
                },
                Err(desync) => {
                    drop(guard);
                    tracing::warn!(
                        %collection,
                        op = desync.source.op(),
                        applied = desync.applied,
                        skipped = desync.skipped,
                        error = %desync.source,
                        "diff feed desync, resync required"
                    );
                    if let Some(reports) = &reports {
                        let _ = reports
                            .send(DesyncReport { collection: collection.clone(), desync });
                    }
                },
            }
        }
        tracing::debug!(%collection, "diff feed stopped");
    });

    FeedHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiffProjector;

    #[test]
    fn apply_batch_counts_skipped_ops() {
        let mut projector = DiffProjector::new();
        let result = projector.apply_batch(vec![
            DiffOp::Push { item: 1 },
            DiffOp::RemoveAt { index: 4 },
            DiffOp::Push { item: 2 },
            DiffOp::Push { item: 3 },
        ]);

        let err = result.unwrap_err();
        assert_eq!(err.applied, 1);
        assert_eq!(err.skipped, 2);
        assert_eq!(projector.items(), [1]);
    }

    #[tokio::test]
    async fn feed_applies_batches_in_order() {
        let projector = Arc::new(Mutex::new(DiffProjector::new()));
        let mut sub = projector.lock().await.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let root = CancellationToken::new();
        let _feed = spawn_feed("test", Arc::clone(&projector), rx, None, &root);

        tx.send(vec![DiffOp::Push { item: "a" }, DiffOp::Push { item: "b" }]).unwrap();
        tx.send(vec![DiffOp::InsertAt { index: 1, item: "c" }]).unwrap();

        let mut last = Vec::new();
        while last != ["a", "c", "b"] {
            last = sub.next().await.unwrap().items().to_vec();
        }
        assert_eq!(projector.lock().await.version(), 3);
    }

    #[tokio::test]
    async fn feed_reports_desync_and_keeps_running() {
        let projector = Arc::new(Mutex::new(DiffProjector::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let root = CancellationToken::new();
        let _feed = spawn_feed("room", Arc::clone(&projector), rx, Some(report_tx), &root);

        tx.send(vec![DiffOp::UpdateAt { index: 5, item: 1 }, DiffOp::Push { item: 2 }]).unwrap();
        let report = report_rx.recv().await.unwrap();
        assert_eq!(report.collection, "room");
        assert_eq!(report.desync.applied, 0);
        assert_eq!(report.desync.skipped, 1);

        tx.send(vec![DiffOp::Replace { items: vec![9] }]).unwrap();
        let mut sub = projector.lock().await.subscribe();
        while sub.next().await.unwrap().items() != [9] {}
    }

    #[tokio::test]
    async fn stopped_feed_applies_nothing() {
        let projector = Arc::new(Mutex::new(DiffProjector::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let root = CancellationToken::new();
        let feed = spawn_feed("room", Arc::clone(&projector), rx, None, &root);

        root.cancel();
        assert!(feed.cancellation().is_cancelled());
        let _ = tx.send(vec![DiffOp::Push { item: 1 }]);
        tokio::task::yield_now().await;

        assert!(projector.lock().await.is_empty());
    }
}
