//! Operations for model-based testing.
//!
//! Operations are generated by proptest or a fuzzer and applied to both a
//! reference model and the real implementation.

use arbitrary::Arbitrary;
use prism_core::DiffOp;
use prism_session::SessionId;

/// Session identifier in the model (small to keep collisions likely).
pub type ModelSessionId = u8;

/// Map a model session id to a real one.
pub fn session_id(id: ModelSessionId) -> SessionId {
    SessionId::new(format!("session-{id}"))
}

/// Diff operation over `u8` items with small indices, so that both valid
/// and out-of-range positions are common.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum DiffOperation {
    /// Append one item.
    Push(u8),
    /// Remove the last item.
    Pop,
    /// Insert at an index.
    InsertAt(u8, u8),
    /// Remove at an index.
    RemoveAt(u8),
    /// Overwrite at an index.
    UpdateAt(u8, u8),
    /// Move between indices.
    Move(u8, u8),
    /// Replace everything.
    Replace(Vec<u8>),
    /// Remove everything.
    Clear,
    /// Append several items.
    Append(Vec<u8>),
    /// Prepend one item.
    PushFront(u8),
    /// Remove the first item.
    PopFront,
    /// Keep only a prefix.
    Truncate(u8),
}

impl DiffOperation {
    /// Diff applied to the real projector.
    pub fn to_diff(&self) -> DiffOp<u8> {
        match self {
            Self::Push(item) => DiffOp::Push { item: *item },
            Self::Pop => DiffOp::Pop,
            Self::InsertAt(index, item) => {
                DiffOp::InsertAt { index: usize::from(*index), item: *item }
            },
            Self::RemoveAt(index) => DiffOp::RemoveAt { index: usize::from(*index) },
            Self::UpdateAt(index, item) => {
                DiffOp::UpdateAt { index: usize::from(*index), item: *item }
            },
            Self::Move(from, to) => DiffOp::Move { from: usize::from(*from), to: usize::from(*to) },
            Self::Replace(items) => DiffOp::Replace { items: items.clone() },
            Self::Clear => DiffOp::Clear,
            Self::Append(items) => DiffOp::Append { items: items.clone() },
            Self::PushFront(item) => DiffOp::PushFront { item: *item },
            Self::PopFront => DiffOp::PopFront,
            Self::Truncate(len) => DiffOp::Truncate { len: usize::from(*len) },
        }
    }
}

/// Session registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum RegistryOperation {
    /// Create (or re-create) a session and activate it.
    Create(ModelSessionId),
    /// Switch the active pointer.
    SetActive(ModelSessionId),
    /// Release a session.
    Release(ModelSessionId),
    /// Release the active session.
    ReleaseActive,
}
