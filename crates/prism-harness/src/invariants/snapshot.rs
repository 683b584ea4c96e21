//! Observable state captured for invariant checking.

use prism_core::RoomId;
use prism_roomlist::{RoomListFilter, RoomListProjection, RoomSummary};
use prism_session::{SessionId, SessionRegistry};
use prism_timeline::{DisplayOrder, EventItem, PaginationStatus, TimelineItem, TimelineProjection};

/// State of one timeline.
#[derive(Debug, Clone)]
pub struct TimelineState {
    /// Room of the timeline.
    pub room_id: RoomId,
    /// Display orientation.
    pub order: DisplayOrder,
    /// Authoritative events, oldest-first.
    pub events: Vec<EventItem>,
    /// Published display sequence.
    pub display: Vec<TimelineItem>,
    /// Back-pagination state.
    pub status: PaginationStatus,
}

impl TimelineState {
    /// Capture a projection.
    pub fn capture(projection: &TimelineProjection) -> Self {
        Self {
            room_id: projection.room_id().to_string(),
            order: projection.config().display_order,
            events: projection.events().to_vec(),
            display: projection.snapshot().items().to_vec(),
            status: projection.pagination_status(),
        }
    }
}

/// State of one room list.
#[derive(Debug, Clone)]
pub struct RoomListState {
    /// Active filter.
    pub filter: RoomListFilter,
    /// Authoritative rooms.
    pub rooms: Vec<RoomSummary>,
    /// Published filtered rooms.
    pub visible: Vec<RoomSummary>,
    /// Pages requested.
    pub loaded_pages: usize,
}

impl RoomListState {
    /// Capture a projection.
    pub fn capture(projection: &RoomListProjection) -> Self {
        Self {
            filter: projection.filter().clone(),
            rooms: projection.rooms().to_vec(),
            visible: projection.snapshot().items().to_vec(),
            loaded_pages: projection.loaded_pages(),
        }
    }
}

/// Everything invariants look at.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Registered session ids.
    pub sessions: Vec<SessionId>,
    /// Active session id.
    pub active: Option<SessionId>,
    /// Captured timelines.
    pub timelines: Vec<TimelineState>,
    /// Captured room lists.
    pub room_lists: Vec<RoomListState>,
    /// Published versions per collection, in observation order.
    pub version_history: Vec<(String, Vec<u64>)>,
}

impl SystemSnapshot {
    /// Empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the registry's sessions and active pointer.
    ///
    /// Both are read under one lock acquisition, as any other reader would.
    pub async fn from_registry(registry: &SessionRegistry) -> Self {
        let (sessions, active) = registry.snapshot().await;
        Self { sessions, active, ..Self::default() }
    }

    /// Add a timeline.
    #[must_use]
    pub fn with_timeline(mut self, projection: &TimelineProjection) -> Self {
        self.timelines.push(TimelineState::capture(projection));
        self
    }

    /// Add a room list.
    #[must_use]
    pub fn with_room_list(mut self, projection: &RoomListProjection) -> Self {
        self.room_lists.push(RoomListState::capture(projection));
        self
    }

    /// Add the versions observed on one collection.
    #[must_use]
    pub fn with_versions(mut self, collection: impl Into<String>, versions: Vec<u64>) -> Self {
        self.version_history.push((collection.into(), versions));
        self
    }
}
