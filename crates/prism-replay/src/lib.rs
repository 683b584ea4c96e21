//! Replay of recorded engine diff scripts.
//!
//! Feeds a [`Script`] through a fresh timeline or room list projection and
//! reports the final snapshot together with every desync encountered. Used to
//! reproduce projection bugs from captured engine traffic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod render;
mod replay;
mod script;

pub use error::ReplayError;
pub use replay::{ReplayOptions, ReplayOutcome, StepDesync, replay};
pub use script::{RoomListStep, Script, TimelineStep};
