//! Scripted synchronization engine.
//!
//! [`FakeEngine`] behaves like a small in-memory server: every room has an
//! older history that backward pagination releases as `PushFront` diffs, and
//! the room list serves pages out of a fixed room set. Every request is
//! recorded as an [`EngineCall`] so tests can assert on what the projection
//! layer asked for. Arbitrary batches, including inconsistent ones, can be
//! injected directly into any feed.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use prism_core::{DiffBatch, DiffOp, PaginationError, RoomId};
use prism_roomlist::{RoomListFilter, RoomListSource, RoomSummary};
use prism_session::{RoomListFeed, SessionError, SyncEngine, TimelineFeed};
use prism_timeline::{EventItem, PaginationOutcome, TimelineSource};
use tokio::sync::mpsc;

/// Request received by the fake engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// A timeline feed was opened.
    OpenTimeline(RoomId),
    /// The room list query was created.
    CreateRoomList {
        /// Requested page size.
        page_size: usize,
        /// Initial filter.
        filter: RoomListFilter,
    },
    /// Backward pagination of a room.
    Paginate {
        /// Room paginated.
        room_id: RoomId,
        /// Requested event count.
        count: u16,
    },
    /// One more room list page.
    LoadMore,
    /// Room list back to its first page.
    Reset,
    /// Engine-side room filter changed.
    UpdateFilter(RoomListFilter),
}

#[derive(Default)]
struct Room {
    /// Events not yet released, oldest-first.
    history: Vec<EventItem>,
    feed: Option<mpsc::UnboundedSender<DiffBatch<EventItem>>>,
    /// Scripted failures, consumed before any history is released.
    failures: VecDeque<PaginationError>,
}

#[derive(Default)]
struct RoomListState {
    rooms: Vec<RoomSummary>,
    page_size: usize,
    /// Rooms released so far.
    cursor: usize,
    filter: RoomListFilter,
    feed: Option<mpsc::UnboundedSender<DiffBatch<RoomSummary>>>,
    failures: VecDeque<PaginationError>,
}

impl RoomListState {
    fn visible(&self) -> Vec<RoomSummary> {
        self.filter.select(&self.rooms).into_iter().take(self.cursor).collect()
    }

    fn send(&self, batch: DiffBatch<RoomSummary>) {
        if let Some(feed) = &self.feed {
            let _ = feed.send(batch);
        }
    }
}

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<EngineCall>>,
    rooms: Mutex<HashMap<RoomId, Room>>,
    room_list: Mutex<RoomListState>,
}

/// Poisoning only means another test thread panicked; the data is still the
/// latest state written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn record(&self, call: EngineCall) {
        tracing::trace!(?call, "fake engine call");
        lock(&self.calls).push(call);
    }
}

/// In-memory engine for tests and simulations.
#[derive(Clone, Default)]
pub struct FakeEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for FakeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeEngine").field("calls", &lock(&self.shared.calls).len()).finish()
    }
}

impl FakeEngine {
    /// Create an engine without rooms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room whose older history is `history` (oldest-first).
    pub fn add_room(&self, room_id: impl Into<RoomId>, history: Vec<EventItem>) {
        let mut rooms = lock(&self.shared.rooms);
        rooms.entry(room_id.into()).or_default().history = history;
    }

    /// Set the rooms the room list query pages through.
    pub fn set_rooms(&self, rooms: Vec<RoomSummary>) {
        lock(&self.shared.room_list).rooms = rooms;
    }

    /// Make the next pagination of `room_id` fail with `error`.
    pub fn fail_next_pagination(&self, room_id: &str, error: PaginationError) {
        let mut rooms = lock(&self.shared.rooms);
        rooms.entry(room_id.to_string()).or_default().failures.push_back(error);
    }

    /// Make the next room list request fail with `error`.
    pub fn fail_next_room_list_request(&self, error: PaginationError) {
        lock(&self.shared.room_list).failures.push_back(error);
    }

    /// Deliver `batch` on the feed of `room_id`. Returns false if the room's
    /// timeline is not open.
    pub fn push_timeline(&self, room_id: &str, batch: DiffBatch<EventItem>) -> bool {
        let rooms = lock(&self.shared.rooms);
        rooms
            .get(room_id)
            .and_then(|room| room.feed.as_ref())
            .is_some_and(|feed| feed.send(batch).is_ok())
    }

    /// Deliver `batch` on the room list feed. Returns false if no room list
    /// was created.
    pub fn push_room_list(&self, batch: DiffBatch<RoomSummary>) -> bool {
        let state = lock(&self.shared.room_list);
        state.feed.as_ref().is_some_and(|feed| feed.send(batch).is_ok())
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        lock(&self.shared.calls).clone()
    }

    /// Forget recorded requests.
    pub fn clear_calls(&self) {
        lock(&self.shared.calls).clear();
    }
}

#[async_trait]
impl SyncEngine for FakeEngine {
    async fn open_timeline(&self, room_id: &str) -> Result<TimelineFeed, SessionError> {
        self.shared.record(EngineCall::OpenTimeline(room_id.to_string()));
        let mut rooms = lock(&self.shared.rooms);
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| SessionError::UnknownRoom(room_id.to_string()))?;

        let (tx, batches) = mpsc::unbounded_channel();
        room.feed = Some(tx);
        let source = Arc::new(FakeTimelineSource {
            shared: Arc::clone(&self.shared),
            room_id: room_id.to_string(),
        });
        Ok(TimelineFeed { source, batches })
    }

    fn create_room_list(&self, page_size: usize, filter: &RoomListFilter) -> RoomListFeed {
        self.shared.record(EngineCall::CreateRoomList { page_size, filter: filter.clone() });
        let (tx, batches) = mpsc::unbounded_channel();

        let mut state = lock(&self.shared.room_list);
        state.page_size = page_size;
        state.cursor = page_size;
        state.filter = filter.clone();
        state.feed = Some(tx);
        let first_page = state.visible();
        state.send(vec![DiffOp::Replace { items: first_page }]);

        let source = Arc::new(FakeRoomListSource { shared: Arc::clone(&self.shared) });
        RoomListFeed { source, batches }
    }
}

/// Backward pagination over a [`FakeEngine`] room.
struct FakeTimelineSource {
    shared: Arc<Shared>,
    room_id: RoomId,
}

#[async_trait]
impl TimelineSource for FakeTimelineSource {
    async fn paginate_backwards(&self, count: u16) -> Result<PaginationOutcome, PaginationError> {
        self.shared.record(EngineCall::Paginate { room_id: self.room_id.clone(), count });
        let mut rooms = lock(&self.shared.rooms);
        let room = rooms
            .get_mut(&self.room_id)
            .ok_or_else(|| PaginationError::Engine(format!("room {} vanished", self.room_id)))?;
        if let Some(error) = room.failures.pop_front() {
            return Err(error);
        }

        let keep = room.history.len().saturating_sub(usize::from(count));
        let released = room.history.split_off(keep);
        // Newest of the released events lands first, directly above the
        // events already shown.
        let batch: DiffBatch<EventItem> =
            released.into_iter().rev().map(|item| DiffOp::PushFront { item }).collect();
        if !batch.is_empty() {
            if let Some(feed) = &room.feed {
                let _ = feed.send(batch);
            }
        }
        Ok(PaginationOutcome { hit_start: room.history.is_empty() })
    }
}

/// Paged room query over a [`FakeEngine`].
struct FakeRoomListSource {
    shared: Arc<Shared>,
}

impl FakeRoomListSource {
    fn take_failure(&self) -> Result<(), PaginationError> {
        lock(&self.shared.room_list).failures.pop_front().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl RoomListSource for FakeRoomListSource {
    async fn load_more(&self) -> Result<(), PaginationError> {
        self.shared.record(EngineCall::LoadMore);
        self.take_failure()?;

        let mut state = lock(&self.shared.room_list);
        let shown = state.visible().len();
        state.cursor += state.page_size;
        let next: Vec<RoomSummary> = state.visible().into_iter().skip(shown).collect();
        if !next.is_empty() {
            state.send(vec![DiffOp::Append { items: next }]);
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), PaginationError> {
        self.shared.record(EngineCall::Reset);
        self.take_failure()?;

        let mut state = lock(&self.shared.room_list);
        let shown = state.visible().len();
        state.cursor = state.page_size;
        let kept = state.visible().len();
        if kept < shown {
            state.send(vec![DiffOp::Truncate { len: kept }]);
        }
        Ok(())
    }

    async fn update_filter(&self, filter: &RoomListFilter) -> Result<(), PaginationError> {
        self.shared.record(EngineCall::UpdateFilter(filter.clone()));
        self.take_failure()?;

        let mut state = lock(&self.shared.room_list);
        state.filter = filter.clone();
        let items = state.visible();
        state.send(vec![DiffOp::Replace { items }]);
        Ok(())
    }
}
