//! Plain-text rendering of snapshots.

use prism_roomlist::RoomSummary;
use prism_timeline::{TimelineItem, VirtualItem};

/// One line per timeline item.
pub fn timeline_lines(items: &[TimelineItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            TimelineItem::Event(event) => {
                format!("{} <{}> {}", event.key, event.sender, event.body)
            },
            TimelineItem::Virtual(VirtualItem::DaySeparator { day, .. }) => {
                format!("--- day {day} ---")
            },
            TimelineItem::Virtual(VirtualItem::ReadMarker) => "--- read ---".to_string(),
            TimelineItem::Virtual(VirtualItem::RoomBeginning) => "[room beginning]".to_string(),
            TimelineItem::Virtual(VirtualItem::LoadingIndicator) => "[loading]".to_string(),
            TimelineItem::Virtual(VirtualItem::TypingIndicator { users }) => {
                format!("[typing: {}]", users.join(", "))
            },
        })
        .collect()
}

/// One line per room.
pub fn room_lines(rooms: &[RoomSummary]) -> Vec<String> {
    rooms
        .iter()
        .map(|room| match room.unread_count {
            0 => format!("{} {}", room.room_id, room.display_name()),
            unread => format!("{} {} ({unread})", room.room_id, room.display_name()),
        })
        .collect()
}
