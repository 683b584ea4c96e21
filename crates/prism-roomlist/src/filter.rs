//! Room name filtering.
//!
//! Filtering is a pure, order-preserving selection over the authoritative
//! room sequence. It never mutates that sequence, so switching back to
//! [`RoomListFilter::All`] restores the exact unfiltered list.

use serde::{Deserialize, Serialize};

use crate::RoomSummary;

/// Filter applied to the room list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "query", rename_all = "snake_case")]
pub enum RoomListFilter {
    /// No filtering.
    #[default]
    All,
    /// Rooms whose normalized display name contains the normalized query.
    NormalizedMatchRoomName(String),
}

impl RoomListFilter {
    /// Build a filter from raw user input.
    ///
    /// Input that normalizes to nothing (empty or whitespace only) yields
    /// [`RoomListFilter::All`].
    pub fn from_query(query: &str) -> Self {
        let normalized = normalize(query);
        if normalized.is_empty() { Self::All } else { Self::NormalizedMatchRoomName(normalized) }
    }

    /// Whether this filter lets every room through.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether `room` passes the filter.
    pub fn matches(&self, room: &RoomSummary) -> bool {
        match self {
            Self::All => true,
            Self::NormalizedMatchRoomName(query) => {
                normalize(room.display_name()).contains(query.as_str())
            },
        }
    }

    /// Rooms passing the filter, in their original order.
    pub fn select(&self, rooms: &[RoomSummary]) -> Vec<RoomSummary> {
        rooms.iter().filter(|room| self.matches(room)).cloned().collect()
    }
}

/// Lowercase, trim and collapse internal whitespace runs to one space.
pub fn normalize(input: &str) -> String {
    input.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms() -> Vec<RoomSummary> {
        vec![
            RoomSummary::placeholder("!1").with_name("Rust  Users"),
            RoomSummary::placeholder("!2").with_name("Gardening"),
            RoomSummary::placeholder("!rust-internals"),
            RoomSummary::placeholder("!4").with_name("rust users (EU)"),
        ]
    }

    #[test]
    fn blank_query_is_no_filter() {
        assert_eq!(RoomListFilter::from_query(""), RoomListFilter::All);
        assert_eq!(RoomListFilter::from_query("  \t "), RoomListFilter::All);
        assert_eq!(
            RoomListFilter::from_query("  Rust   USERS "),
            RoomListFilter::NormalizedMatchRoomName("rust users".into())
        );
    }

    #[test]
    fn matches_normalized_names_and_ids() {
        let filter = RoomListFilter::from_query("rust");
        let ids: Vec<_> = filter.select(&rooms()).into_iter().map(|r| r.room_id).collect();
        assert_eq!(ids, ["!1", "!rust-internals", "!4"]);

        let filter = RoomListFilter::from_query("RUST users");
        let ids: Vec<_> = filter.select(&rooms()).into_iter().map(|r| r.room_id).collect();
        assert_eq!(ids, ["!1", "!4"]);
    }

    #[test]
    fn all_keeps_everything() {
        assert_eq!(RoomListFilter::All.select(&rooms()), rooms());
    }
}
