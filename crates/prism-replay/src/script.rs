//! Replay script format.
//!
//! A script is a JSON document naming the collection and listing the steps
//! the engine and the user performed, in order:
//!
//! ```json
//! {
//!   "kind": "timeline",
//!   "room_id": "!lobby:example.org",
//!   "steps": [
//!     { "step": "batch", "ops": [{ "op": "push", "item": { ... } }] },
//!     { "step": "typing", "users": ["@bob:example.org"] }
//!   ]
//! }
//! ```

use std::{fs, path::Path};

use prism_core::DiffOp;
use prism_roomlist::RoomSummary;
use prism_timeline::{EventItem, EventKey};
use serde::{Deserialize, Serialize};

use crate::ReplayError;

/// A recorded session of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Script {
    /// Timeline of one room.
    Timeline {
        /// Room replayed.
        room_id: String,
        /// Steps in order.
        #[serde(default)]
        steps: Vec<TimelineStep>,
    },
    /// The room list.
    RoomList {
        /// Steps in order.
        #[serde(default)]
        steps: Vec<RoomListStep>,
    },
}

/// One step of a timeline script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TimelineStep {
    /// Diff batch from the engine.
    Batch {
        /// Operations in order.
        ops: Vec<DiffOp<EventItem>>,
    },
    /// Cached events posted before the live feed.
    Initial {
        /// Events, oldest-first.
        items: Vec<EventItem>,
    },
    /// Read marker moved.
    LastRead {
        /// New last read event.
        key: Option<EventKey>,
    },
    /// Typing users changed.
    Typing {
        /// Users typing.
        users: Vec<String>,
    },
    /// A backward pagination completed.
    Paginated {
        /// Start of the room was reached.
        hit_start: bool,
    },
}

/// One step of a room list script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum RoomListStep {
    /// Diff batch from the engine.
    Batch {
        /// Operations in order.
        ops: Vec<DiffOp<RoomSummary>>,
    },
    /// User typed a filter query.
    Filter {
        /// Raw query.
        query: String,
    },
    /// Visibility changed.
    Active {
        /// Whether the list is visible.
        active: bool,
    },
    /// One more page requested.
    LoadMore,
    /// List reset.
    Reset,
}

impl Script {
    /// Parse a script from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ReplayError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        match self {
            Self::Timeline { steps, .. } => steps.len(),
            Self::RoomList { steps } => steps.len(),
        }
    }

    /// Whether the script has no steps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
