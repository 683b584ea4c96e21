//! Room list projection.
//!
//! The engine keeps a paged query over the user's rooms and streams it as
//! diffs. [`RoomListProjection`] mirrors that query, filters it locally by
//! room name and tracks how many pages were requested. [`RoomList`] runs a
//! projection against a [`RoomListSource`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filter;
mod list;
mod projection;
mod source;
mod summary;

pub use config::RoomListConfig;
pub use filter::{RoomListFilter, normalize};
pub use list::RoomList;
pub use projection::{RoomListAction, RoomListProjection};
pub use source::RoomListSource;
pub use summary::RoomSummary;
