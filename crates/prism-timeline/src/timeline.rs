//! Async handle driving one [`TimelineProjection`].

use std::sync::Arc;

use prism_core::{
    CancellationToken, DesyncError, DesyncReport, DiffBatch, DiffOp, FeedHandle, PaginationError,
    RoomId, Snapshot, Subscriber, spawn_feed,
};
use tokio::sync::{Mutex, mpsc};

use crate::{
    EventItem, EventKey, PaginationOutcome, PaginationStatus, TimelineConfig, TimelineItem,
    TimelineProjection, TimelineSource,
};

/// Live timeline of one room.
///
/// Owns the projection, the feed task applying engine diffs to it and the
/// engine's pagination primitive. Closing the timeline (or its parent token)
/// stops the feed and aborts any in-flight pagination.
pub struct Timeline {
    room_id: RoomId,
    config: TimelineConfig,
    projection: Arc<Mutex<TimelineProjection>>,
    source: Arc<dyn TimelineSource>,
    cancel: CancellationToken,
    feed: FeedHandle,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("room_id", &self.room_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Timeline {
    /// Start a timeline fed by `batches`.
    ///
    /// Desync violations are forwarded to `reports` if given. Must be called
    /// from within a Tokio runtime.
    pub fn spawn(
        room_id: impl Into<RoomId>,
        config: TimelineConfig,
        source: Arc<dyn TimelineSource>,
        batches: mpsc::UnboundedReceiver<DiffBatch<EventItem>>,
        reports: Option<mpsc::UnboundedSender<DesyncReport>>,
        parent: &CancellationToken,
    ) -> Self {
        let room_id = room_id.into();
        let cancel = parent.child_token();
        let projection =
            Arc::new(Mutex::new(TimelineProjection::new(room_id.clone(), config.clone())));
        let feed = spawn_feed(room_id.clone(), Arc::clone(&projection), batches, reports, &cancel);

        tracing::debug!(room_id = %room_id, "timeline opened");
        Self { room_id, config, projection, source, cancel, feed }
    }

    /// Room this timeline belongs to.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Request up to `count` older events from the engine.
    ///
    /// Returns once the engine served the request. The events themselves
    /// arrive on the diff feed. Dropping the returned future cancels the
    /// request and frees the pagination slot for the next one.
    ///
    /// # Errors
    ///
    /// - [`PaginationError::CannotPaginate`] if a pagination is running or the
    ///   start of the room was reached
    /// - [`PaginationError::Cancelled`] if the timeline was closed
    /// - whatever the engine reported
    pub async fn paginate_backwards(
        &self,
        count: u16,
    ) -> Result<PaginationOutcome, PaginationError> {
        if self.cancel.is_cancelled() {
            return Err(PaginationError::Cancelled);
        }
        self.projection.lock().await.begin_back_pagination()?;
        let pending = PendingPagination { projection: Arc::clone(&self.projection), armed: true };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(PaginationError::Cancelled),
            result = self.source.paginate_backwards(count) => result,
        };

        match &result {
            Ok(outcome) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    count,
                    hit_start = outcome.hit_start,
                    "paginated backwards"
                );
            },
            Err(PaginationError::Cancelled) => {
                tracing::debug!(room_id = %self.room_id, "back pagination cancelled");
            },
            Err(error) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    %error,
                    transient = error.is_transient(),
                    "back pagination failed"
                );
            },
        }

        self.projection.lock().await.finish_back_pagination(&result);
        pending.disarm();
        result
    }

    /// Paginate backwards by the configured page size.
    pub async fn paginate(&self) -> Result<PaginationOutcome, PaginationError> {
        self.paginate_backwards(self.config.pagination_size).await
    }

    /// Install cached events before the live feed catches up.
    ///
    /// `items` is oldest-first; the newest chunk becomes visible first.
    pub async fn post_initial_items(&self, items: Vec<EventItem>) -> Result<(), DesyncError> {
        let count = items.len();
        self.projection.lock().await.post_initial_items(&items)?;
        tracing::debug!(room_id = %self.room_id, count, "posted initial items");
        Ok(())
    }

    /// Apply a local diff, e.g. an optimistic echo of a sent message.
    pub async fn apply(&self, op: DiffOp<EventItem>) -> Result<(), DesyncError> {
        self.projection.lock().await.apply(op)
    }

    /// Move the read marker.
    pub async fn set_last_read(&self, key: Option<EventKey>) {
        self.projection.lock().await.set_last_read(key);
    }

    /// Replace the set of typing users.
    pub async fn set_typing(&self, users: Vec<String>) {
        self.projection.lock().await.set_typing(users);
    }

    /// Latest display snapshot.
    pub async fn snapshot(&self) -> Snapshot<TimelineItem> {
        self.projection.lock().await.snapshot()
    }

    /// Subscribe to display snapshots, starting with the current one.
    pub async fn subscribe(&self) -> Subscriber<Snapshot<TimelineItem>> {
        self.projection.lock().await.subscribe()
    }

    /// Current back-pagination state.
    pub async fn pagination_status(&self) -> PaginationStatus {
        self.projection.lock().await.pagination_status()
    }

    /// Subscribe to back-pagination state changes.
    pub async fn subscribe_pagination(&self) -> Subscriber<PaginationStatus> {
        self.projection.lock().await.subscribe_pagination()
    }

    /// Run `f` against the projection under its lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&TimelineProjection) -> R) -> R {
        f(&*self.projection.lock().await)
    }

    /// Stop the feed and abort in-flight pagination.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(room_id = %self.room_id, "timeline closed");
        }
        self.cancel.cancel();
        self.feed.stop();
    }

    /// Whether the timeline was closed, directly or through its parent.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Ends a started back-pagination as cancelled if the future driving it is
/// dropped before the outcome was recorded.
struct PendingPagination {
    projection: Arc<Mutex<TimelineProjection>>,
    armed: bool,
}

impl PendingPagination {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingPagination {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let cancelled: Result<PaginationOutcome, PaginationError> = Err(PaginationError::Cancelled);
        if let Ok(mut projection) = self.projection.try_lock() {
            projection.finish_back_pagination(&cancelled);
            return;
        }
        // Lock is busy (feed batch in progress); finish once it frees up.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let projection = Arc::clone(&self.projection);
            runtime.spawn(async move {
                projection.lock().await.finish_back_pagination(&cancelled);
            });
        }
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
