//! Engine-facing pagination primitive.

use async_trait::async_trait;
use prism_core::PaginationError;

/// Result of a backward pagination request.
///
/// The loaded events themselves arrive through the diff feed, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOutcome {
    /// The start of the room history was reached.
    pub hit_start: bool,
}

/// Backward pagination provided by the synchronization engine for one room.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Ask the engine for up to `count` older events.
    ///
    /// Completion only means the request was served; new events are
    /// delivered as `PushFront`/`InsertAt` diffs on the room's feed.
    async fn paginate_backwards(&self, count: u16) -> Result<PaginationOutcome, PaginationError>;
}

/// Back-pagination state of one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationStatus {
    /// A backward pagination request is in flight.
    pub is_paginating: bool,
    /// Older history may still exist on the server.
    pub has_more_to_load: bool,
}

impl Default for PaginationStatus {
    fn default() -> Self {
        Self { is_paginating: false, has_more_to_load: true }
    }
}

impl PaginationStatus {
    /// Whether a new backward pagination may start.
    pub fn can_paginate(&self) -> bool {
        !self.is_paginating && self.has_more_to_load
    }
}
