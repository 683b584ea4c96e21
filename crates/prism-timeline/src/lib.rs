//! Room timeline projection.
//!
//! A timeline mirrors the event sequence the engine keeps for one room and
//! decorates it for display. The engine feed is applied to an oldest-first
//! event sequence; the observable sequence adds day separators, the read
//! marker, a loading or room-beginning marker and a typing indicator, in the
//! orientation chosen by [`TimelineConfig::display_order`].
//!
//! [`TimelineProjection`] is the pure state; [`Timeline`] drives it from a
//! feed task and forwards back-pagination requests to a [`TimelineSource`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod item;
mod projection;
mod source;
mod timeline;
pub mod virtuals;

pub use config::{DisplayOrder, TimelineConfig};
pub use item::{EventItem, EventKey, TimelineItem, VirtualItem};
pub use projection::TimelineProjection;
pub use source::{PaginationOutcome, PaginationStatus, TimelineSource};
pub use timeline::Timeline;
