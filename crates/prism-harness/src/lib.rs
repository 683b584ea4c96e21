//! Test harness for the projection layer.
//!
//! # Scripted Engine
//!
//! [`FakeEngine`] implements the engine traits in memory: rooms with older
//! history for back-pagination, a paged room set for the room list, scripted
//! failures and direct injection of arbitrary diff batches.
//!
//! # Model-Based Testing
//!
//! The `model` module provides reference implementations of diff application
//! and of the session registry. Operations are applied to both the model and
//! the real implementation, and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold after any
//! operation sequence. Use [`InvariantRegistry::standard()`] for all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod invariants;
pub mod model;

pub use engine::{EngineCall, FakeEngine};
pub use invariants::{
    ActiveSessionRegistered, DisplayMatchesEvents, FilterPreservesOrder, HistoryEdgeMatchesStatus,
    Invariant, InvariantRegistry, InvariantResult, PagesNeverBelowOne, RoomListState,
    SystemSnapshot, TimelineState, VersionMonotonicity, Violation,
};
pub use model::{
    DiffOperation, ModelOutcome, ModelRegistry, ModelSequence, ModelSessionId, RegistryOperation,
    session_id,
};
