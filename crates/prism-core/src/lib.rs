//! Core of the Prism projection layer.
//!
//! The synchronization engine emits ordered batches of list mutations. This
//! crate turns them into a locally consistent, observable collection:
//!
//! - [`DiffOp`]: one mutation instruction (push, insert, move, replace, ...)
//! - [`DiffProjector`]: applies operations to an authoritative sequence and
//!   publishes a [`Snapshot`] after each one
//! - [`Observable`] / [`Subscriber`]: lossless fan-out of published values
//! - [`spawn_feed`]: single-writer task draining an engine channel into any
//!   [`ApplyDiff`] implementation
//!
//! Out-of-range operations are never silently dropped. They surface as
//! [`DesyncError`] so the owner can request a full resync from the engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod error;
mod feed;
mod observable;
mod projector;
mod snapshot;

pub use diff::DiffOp;
pub use error::{BatchDesync, DesyncError, PaginationError};
pub use feed::{ApplyDiff, DesyncReport, DiffBatch, FeedHandle, spawn_feed};
pub use observable::{Observable, Subscriber};
pub use projector::{DiffProjector, SnapshotOrder};
pub use snapshot::Snapshot;
// Re-exported so downstream crates share one cancellation type.
pub use tokio_util::sync::CancellationToken;

/// Stable room identifier assigned by the engine.
pub type RoomId = String;
