//! Engine-facing paged query primitive.

use async_trait::async_trait;
use prism_core::PaginationError;

use crate::RoomListFilter;

/// Paged room query owned by the synchronization engine.
///
/// Results are never returned directly. The engine answers every request
/// with diffs on the room list feed.
#[async_trait]
pub trait RoomListSource: Send + Sync {
    /// Extend the query by one page.
    async fn load_more(&self) -> Result<(), PaginationError>;

    /// Shrink the query back to its first page.
    async fn reset(&self) -> Result<(), PaginationError>;

    /// Replace the engine-side filter.
    async fn update_filter(&self, filter: &RoomListFilter) -> Result<(), PaginationError>;
}
