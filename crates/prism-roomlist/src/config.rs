//! Room list configuration.

/// Room list tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListConfig {
    /// Rooms requested per page.
    pub page_size: usize,
}

impl Default for RoomListConfig {
    fn default() -> Self {
        Self { page_size: 30 }
    }
}
