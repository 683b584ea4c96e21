//! Error types for the projection layer.
//!
//! Two failure families exist and they are kept apart on purpose:
//! desync violations (the upstream feed referenced a position the projection
//! does not have) and pagination failures (the engine could not serve a
//! request). The first is recovered by a full resync, the second is reported
//! to whoever asked for more items.

use std::time::Duration;

use thiserror::Error;

/// An incoming diff operation cannot be applied to the current sequence.
///
/// The sequence is left exactly as it was before the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DesyncError {
    /// Index-bearing operation referenced a position outside the sequence.
    #[error("{op}: index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Operation name.
        op: &'static str,
        /// Offending index.
        index: usize,
        /// Sequence length when the operation was applied.
        len: usize,
    },

    /// Move referenced a source or target outside the sequence.
    #[error("move: {from} -> {to} out of bounds for length {len}")]
    MoveOutOfBounds {
        /// Source position.
        from: usize,
        /// Target position.
        to: usize,
        /// Sequence length when the operation was applied.
        len: usize,
    },

    /// Removal from an empty sequence.
    #[error("{op}: sequence is empty")]
    EmptySequence {
        /// Operation name.
        op: &'static str,
    },

    /// Truncate asked to keep more items than exist.
    #[error("truncate: cannot keep {requested} items of {len}")]
    TruncateBeyondLength {
        /// Requested length.
        requested: usize,
        /// Sequence length when the operation was applied.
        len: usize,
    },
}

impl DesyncError {
    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        match self {
            Self::IndexOutOfBounds { op, .. } | Self::EmptySequence { op } => op,
            Self::MoveOutOfBounds { .. } => "move",
            Self::TruncateBeyondLength { .. } => "truncate",
        }
    }
}

/// A batch stopped at its first desync violation.
///
/// Operations after the failing one were computed against a state the
/// projection never reached, so they are skipped rather than applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("batch desync after {applied} applied ({skipped} skipped): {source}")]
pub struct BatchDesync {
    /// Operations applied before the failure.
    pub applied: usize,
    /// Operations skipped after the failure.
    pub skipped: usize,
    /// The failing operation's violation.
    #[source]
    pub source: DesyncError,
}

/// A pagination or incremental load request did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// Request rejected locally, nothing was sent to the engine.
    #[error("cannot paginate: {reason}")]
    CannotPaginate {
        /// Why the request was rejected.
        reason: &'static str,
    },

    /// Consumer went away (inactive, closed, or session released).
    #[error("pagination cancelled")]
    Cancelled,

    /// Engine did not answer in time.
    #[error("engine timed out after {elapsed:?}")]
    Timeout {
        /// How long the engine was given.
        elapsed: Duration,
    },

    /// Engine reported a failure (transport error, invalid handle, ...).
    #[error("engine error: {0}")]
    Engine(String),
}

impl PaginationError {
    /// Returns true if the same request may succeed when issued again.
    ///
    /// Only timeouts qualify. Retry policy itself belongs to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_transient() {
        assert!(PaginationError::Timeout { elapsed: Duration::from_secs(30) }.is_transient());
    }

    #[test]
    fn other_pagination_errors_are_not_transient() {
        assert!(!PaginationError::Cancelled.is_transient());
        assert!(!PaginationError::CannotPaginate { reason: "busy" }.is_transient());
        assert!(!PaginationError::Engine("connection reset".to_string()).is_transient());
    }

    #[test]
    fn desync_op_names() {
        let err = DesyncError::IndexOutOfBounds { op: "update_at", index: 5, len: 3 };
        assert_eq!(err.op(), "update_at");
        assert_eq!(DesyncError::MoveOutOfBounds { from: 0, to: 9, len: 2 }.op(), "move");
        assert_eq!(DesyncError::EmptySequence { op: "pop" }.op(), "pop");
        assert_eq!(DesyncError::TruncateBeyondLength { requested: 4, len: 1 }.op(), "truncate");
    }

    #[test]
    fn batch_desync_message_includes_cause() {
        let err = BatchDesync {
            applied: 2,
            skipped: 1,
            source: DesyncError::IndexOutOfBounds { op: "remove_at", index: 7, len: 2 },
        };
        assert_eq!(
            err.to_string(),
            "batch desync after 2 applied (1 skipped): remove_at: index 7 out of bounds for length 2"
        );
    }
}
