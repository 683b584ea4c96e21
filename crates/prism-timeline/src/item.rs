//! Timeline item types.
//!
//! The engine feed carries only [`EventItem`]s. [`VirtualItem`]s are
//! synthesized locally from the event sequence and a few flags, and the two
//! are merged into [`TimelineItem`]s for display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a timeline event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EventKey {
    /// Durable id assigned once the server accepted the event.
    Remote(String),
    /// Local transaction id of an event not yet confirmed by the server.
    Local(String),
}

impl EventKey {
    /// Raw identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(id) | Self::Local(id) => id,
        }
    }

    /// Whether the event is still waiting for server confirmation.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "local:{id}"),
        }
    }
}

/// An event as delivered by the engine feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    /// Stable identity.
    pub key: EventKey,
    /// Sender user id.
    pub sender: String,
    /// Origin server timestamp, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Rendered body. Opaque to the projection.
    pub body: String,
}

impl EventItem {
    /// Create an event item.
    pub fn new(
        key: EventKey,
        sender: impl Into<String>,
        timestamp_ms: u64,
        body: impl Into<String>,
    ) -> Self {
        Self { key, sender: sender.into(), timestamp_ms, body: body.into() }
    }
}

/// Locally synthesized display entry with no remote counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "virtual", rename_all = "snake_case")]
pub enum VirtualItem {
    /// Separator before the first event of a calendar day.
    DaySeparator {
        /// Day number since the Unix epoch, in the configured UTC offset.
        day: i64,
        /// Timestamp of the first event of that day.
        timestamp_ms: u64,
    },
    /// Position of the user's own read marker.
    ReadMarker,
    /// Start of the room history was reached.
    RoomBeginning,
    /// More history can be loaded backwards.
    LoadingIndicator,
    /// Other members are typing.
    TypingIndicator {
        /// Typing user ids.
        users: Vec<String>,
    },
}

/// Entry of the observable timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TimelineItem {
    /// Event from the engine feed.
    Event(EventItem),
    /// Locally synthesized entry.
    Virtual(VirtualItem),
}

impl TimelineItem {
    /// Identifier unique within one timeline snapshot.
    pub fn unique_id(&self) -> String {
        match self {
            Self::Event(event) => event.key.to_string(),
            Self::Virtual(VirtualItem::DaySeparator { day, .. }) => format!("virtual:day:{day}"),
            Self::Virtual(VirtualItem::ReadMarker) => "virtual:read_marker".to_string(),
            Self::Virtual(VirtualItem::RoomBeginning) => "virtual:room_beginning".to_string(),
            Self::Virtual(VirtualItem::LoadingIndicator) => "virtual:loading".to_string(),
            Self::Virtual(VirtualItem::TypingIndicator { .. }) => "virtual:typing".to_string(),
        }
    }

    /// Event payload, if this is an event.
    pub fn as_event(&self) -> Option<&EventItem> {
        match self {
            Self::Event(event) => Some(event),
            Self::Virtual(_) => None,
        }
    }

    /// Whether this entry was synthesized locally.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }
}
