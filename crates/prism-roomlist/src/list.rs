//! Async handle executing room list actions.

use std::sync::Arc;

use prism_core::{
    CancellationToken, DesyncReport, DiffBatch, FeedHandle, PaginationError, Snapshot, Subscriber,
    spawn_feed,
};
use tokio::sync::{Mutex, mpsc};

use crate::{
    RoomListAction, RoomListConfig, RoomListFilter, RoomListProjection, RoomListSource,
    RoomSummary,
};

/// Feed label used in logs and desync reports.
const COLLECTION: &str = "room_list";

/// Live room list.
///
/// State changes happen synchronously on the projection; the resulting
/// [`RoomListAction`]s are then forwarded to the engine. No lock is held
/// while the engine is awaited, so the feed keeps applying diffs meanwhile.
///
/// Page loads run under an activation token. Becoming inactive cancels it, so
/// a load still in flight returns [`PaginationError::Cancelled`] instead of
/// completing against a list that was already reset.
pub struct RoomList {
    projection: Arc<Mutex<RoomListProjection>>,
    source: Arc<dyn RoomListSource>,
    cancel: CancellationToken,
    /// Child of `cancel`, replaced every time the list becomes inactive.
    activation: Mutex<CancellationToken>,
    feed: FeedHandle,
}

impl std::fmt::Debug for RoomList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomList").field("closed", &self.is_closed()).finish_non_exhaustive()
    }
}

impl RoomList {
    /// Start a room list fed by `batches`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        config: RoomListConfig,
        initial_filter: RoomListFilter,
        source: Arc<dyn RoomListSource>,
        batches: mpsc::UnboundedReceiver<DiffBatch<RoomSummary>>,
        reports: Option<mpsc::UnboundedSender<DesyncReport>>,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let activation = Mutex::new(cancel.child_token());
        let projection =
            Arc::new(Mutex::new(RoomListProjection::with_filter(config, initial_filter)));
        let feed = spawn_feed(COLLECTION, Arc::clone(&projection), batches, reports, &cancel);
        Self { projection, source, cancel, activation, feed }
    }

    /// Request one more page.
    ///
    /// # Errors
    ///
    /// The engine's failure, or [`PaginationError::Cancelled`] if the list was
    /// closed or became inactive meanwhile. A failed or dropped load does not
    /// count as a loaded page.
    pub async fn load_more(&self) -> Result<(), PaginationError> {
        let (actions, loads) = {
            let mut projection = self.projection.lock().await;
            let actions = projection.load_more();
            (actions, self.activation.lock().await.clone())
        };
        self.execute(actions, &loads).await
    }

    /// Return to the unfiltered single-page state.
    pub async fn reset(&self) -> Result<(), PaginationError> {
        let actions = self.projection.lock().await.reset();
        self.execute(actions, &self.cancel).await
    }

    /// Swap the filter. The local view is recomputed before the engine is told.
    pub async fn update_filter(&self, filter: RoomListFilter) -> Result<(), PaginationError> {
        let actions = self.projection.lock().await.update_filter(filter);
        self.execute(actions, &self.cancel).await
    }

    /// Toggle visibility.
    ///
    /// Going inactive cancels page loads still in flight before the engine is
    /// asked to reset.
    pub async fn set_is_active(&self, active: bool) -> Result<(), PaginationError> {
        let (actions, loads) = {
            let mut projection = self.projection.lock().await;
            let mut activation = self.activation.lock().await;
            let actions = projection.set_is_active(active);
            if !active && !actions.is_empty() {
                std::mem::replace(&mut *activation, self.cancel.child_token()).cancel();
            }
            (actions, activation.clone())
        };
        tracing::debug!(active, "room list activity changed");
        self.execute(actions, &loads).await
    }

    /// Forward `actions` in order. Loads race `loads`, everything else races
    /// the list's own token.
    async fn execute(
        &self,
        actions: Vec<RoomListAction>,
        loads: &CancellationToken,
    ) -> Result<(), PaginationError> {
        for action in actions {
            let (scope, pending) = match &action {
                RoomListAction::LoadMore { page } => {
                    let projection = Arc::clone(&self.projection);
                    let pending = PendingLoad { projection, page: *page, armed: true };
                    (loads, Some(pending))
                },
                RoomListAction::Reset | RoomListAction::UpdateFilter { .. } => (&self.cancel, None),
            };

            let result = tokio::select! {
                biased;
                () = scope.cancelled() => Err(PaginationError::Cancelled),
                result = self.run(&action) => result,
            };

            if let Err(error) = result {
                if let Some(pending) = pending {
                    self.projection.lock().await.load_more_failed(pending.page);
                    pending.disarm();
                }
                match &error {
                    PaginationError::Cancelled => {
                        tracing::debug!(?action, "room list request cancelled");
                    },
                    _ => tracing::warn!(?action, %error, "room list request failed"),
                }
                return Err(error);
            }
            if let Some(pending) = pending {
                pending.disarm();
            }
        }
        Ok(())
    }

    async fn run(&self, action: &RoomListAction) -> Result<(), PaginationError> {
        match action {
            RoomListAction::LoadMore { .. } => self.source.load_more().await,
            RoomListAction::Reset => self.source.reset().await,
            RoomListAction::UpdateFilter { filter } => self.source.update_filter(filter).await,
        }
    }

    /// Pages requested so far.
    pub async fn loaded_pages(&self) -> usize {
        self.projection.lock().await.loaded_pages()
    }

    /// Current filter.
    pub async fn filter(&self) -> RoomListFilter {
        self.projection.lock().await.filter().clone()
    }

    /// Whether the list is currently visible.
    pub async fn is_active(&self) -> bool {
        self.projection.lock().await.is_active()
    }

    /// Latest filtered snapshot.
    pub async fn snapshot(&self) -> Snapshot<RoomSummary> {
        self.projection.lock().await.snapshot()
    }

    /// Subscribe to filtered snapshots, starting with the current one.
    pub async fn subscribe(&self) -> Subscriber<Snapshot<RoomSummary>> {
        self.projection.lock().await.subscribe()
    }

    /// Run `f` against the projection under its lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&RoomListProjection) -> R) -> R {
        f(&*self.projection.lock().await)
    }

    /// Stop the feed and abort in-flight requests.
    pub fn close(&self) {
        self.cancel.cancel();
        self.feed.stop();
    }

    /// Whether the list was closed, directly or through its parent.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for RoomList {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Page counted by the projection but not yet served by the engine.
///
/// Rolls the counter back if the future executing the load is dropped.
struct PendingLoad {
    projection: Arc<Mutex<RoomListProjection>>,
    page: usize,
    armed: bool,
}

impl PendingLoad {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let page = self.page;
        if let Ok(mut projection) = self.projection.try_lock() {
            projection.load_more_failed(page);
            return;
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let projection = Arc::clone(&self.projection);
            runtime.spawn(async move { projection.lock().await.load_more_failed(page) });
        }
    }
}
