//! Session layer errors.

use prism_core::RoomId;
use thiserror::Error;

/// Errors from session graphs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The engine does not know the room.
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),

    /// The graph was released or shut down.
    #[error("session closed")]
    Closed,

    /// Engine failure while opening a projection.
    #[error("engine error: {0}")]
    Engine(String),
}
