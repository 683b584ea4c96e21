//! Timeline configuration.

/// Orientation of the observable timeline.
///
/// The authoritative event sequence is always oldest-first, in feed order.
/// This only affects the published display sequence, and it is applied after
/// virtual items are interleaved so separators stay attached to their events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOrder {
    /// Oldest entry first (chronological reading order).
    #[default]
    OldestFirst,
    /// Newest entry first, for reverse-layout lists.
    NewestFirst,
}

/// Timeline tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Events requested per backward pagination.
    pub pagination_size: u16,
    /// Events installed per step when posting the initial cached items.
    pub initial_chunk_size: usize,
    /// Orientation of the observable timeline.
    pub display_order: DisplayOrder,
    /// Offset from UTC used to compute day boundaries, in minutes.
    pub utc_offset_minutes: i32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pagination_size: 50,
            initial_chunk_size: 50,
            display_order: DisplayOrder::OldestFirst,
            utc_offset_minutes: 0,
        }
    }
}
