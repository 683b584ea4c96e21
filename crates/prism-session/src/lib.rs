//! Session layer of the projection stack.
//!
//! A [`SessionRegistry`] owns one [`SessionGraph`] per logged-in account and
//! tracks which one is active. Each graph wires the account's
//! [`SyncEngine`] into a room list and on-demand timelines.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod graph;
mod registry;
mod session;

pub use config::SessionConfig;
pub use engine::{RoomListFeed, SyncEngine, TimelineFeed};
pub use error::SessionError;
pub use graph::SessionGraph;
pub use registry::SessionRegistry;
pub use session::{Session, SessionId};
