//! Room summaries as delivered by the engine's room list feed.

use prism_core::RoomId;
use serde::{Deserialize, Serialize};

/// One row of the room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Stable room identifier.
    pub room_id: RoomId,
    /// Computed display name, if the room has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Unread message count.
    #[serde(default)]
    pub unread_count: u32,
    /// Preview of the latest message.
    #[serde(default)]
    pub last_message: Option<String>,
    /// Timestamp of the latest message, milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_message_timestamp_ms: Option<u64>,
    /// Whether this is a direct conversation.
    #[serde(default)]
    pub is_direct: bool,
}

impl RoomSummary {
    /// Summary with only an id, as sent for rooms not loaded yet.
    pub fn placeholder(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            name: None,
            unread_count: 0,
            last_message: None,
            last_message_timestamp_ms: None,
            is_direct: false,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown to the user: the room name, else the room id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        let room = RoomSummary::placeholder("!abc:example.org");
        assert_eq!(room.display_name(), "!abc:example.org");
        assert_eq!(room.with_name("Lobby").display_name(), "Lobby");
    }

    #[test]
    fn decodes_minimal_json() {
        let room: RoomSummary = serde_json::from_str(r#"{"room_id":"!a"}"#).unwrap();
        assert_eq!(room, RoomSummary::placeholder("!a"));
    }
}
