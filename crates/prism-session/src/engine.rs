//! Synchronization engine boundary.
//!
//! Each session talks to one engine. The engine owns networking and the
//! authoritative data; the projection layer only consumes its diff feeds and
//! forwards paging requests through the returned sources.

use std::sync::Arc;

use async_trait::async_trait;
use prism_core::DiffBatch;
use prism_roomlist::{RoomListFilter, RoomListSource, RoomSummary};
use prism_timeline::{EventItem, TimelineSource};
use tokio::sync::mpsc;

use crate::SessionError;

/// Diff feed and pagination primitive of one room.
pub struct TimelineFeed {
    /// Backward pagination for the room.
    pub source: Arc<dyn TimelineSource>,
    /// Diff batches for the room's events.
    pub batches: mpsc::UnboundedReceiver<DiffBatch<EventItem>>,
}

/// Diff feed and paged query of the room list.
pub struct RoomListFeed {
    /// Paging and filter requests.
    pub source: Arc<dyn RoomListSource>,
    /// Diff batches for the room summaries.
    pub batches: mpsc::UnboundedReceiver<DiffBatch<RoomSummary>>,
}

/// Synchronization engine of one logged-in account.
#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// Open the event feed of `room_id`.
    async fn open_timeline(&self, room_id: &str) -> Result<TimelineFeed, SessionError>;

    /// Create the paged room query. Must not block on I/O; the first page is
    /// delivered through the feed.
    fn create_room_list(&self, page_size: usize, filter: &RoomListFilter) -> RoomListFeed;
}
