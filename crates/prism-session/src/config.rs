//! Session configuration.

use prism_roomlist::{RoomListConfig, RoomListFilter};
use prism_timeline::TimelineConfig;

/// Configuration shared by every graph a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Settings for timelines opened by a graph.
    pub timeline: TimelineConfig,
    /// Settings for the graph's room list.
    pub room_list: RoomListConfig,
    /// Filter the room list starts with.
    pub initial_filter: RoomListFilter,
}
