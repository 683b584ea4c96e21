//! Diff operations emitted by the synchronization engine.
//!
//! A [`DiffOp`] is one incremental mutation of an ordered collection. The
//! engine produces them in batches and the projector applies them strictly in
//! arrival order. Operations never carry any knowledge about the payload they
//! move around; items are identified by position only.

use serde::{Deserialize, Serialize};

/// One incremental mutation of an ordered collection.
///
/// Index-bearing variants must reference a valid position in the collection
/// at the moment they are applied. Anything else is reported as a
/// [`DesyncError`](crate::DesyncError) and leaves the collection untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOp<T> {
    /// Append one item to the tail.
    Push {
        /// Item to append.
        item: T,
    },

    /// Remove the tail item.
    Pop,

    /// Insert an item at `index`, shifting successors towards the tail.
    InsertAt {
        /// Target position, `0..=len`.
        index: usize,
        /// Item to insert.
        item: T,
    },

    /// Remove the item at `index`, shifting successors towards the head.
    RemoveAt {
        /// Position to remove, `0..len`.
        index: usize,
    },

    /// Replace the item at `index` in place.
    UpdateAt {
        /// Position to overwrite, `0..len`.
        index: usize,
        /// New item.
        item: T,
    },

    /// Relocate an item, preserving the relative order of all others.
    ///
    /// `to` is the final position of the moved item.
    Move {
        /// Current position of the item, `0..len`.
        from: usize,
        /// Final position of the item, `0..len`.
        to: usize,
    },

    /// Discard the whole collection and install `items` instead.
    Replace {
        /// New authoritative sequence.
        items: Vec<T>,
    },

    /// Empty the collection.
    Clear,

    /// Append several items to the tail, in order.
    Append {
        /// Items to append.
        items: Vec<T>,
    },

    /// Insert one item at the head.
    PushFront {
        /// Item to prepend.
        item: T,
    },

    /// Remove the head item.
    PopFront,

    /// Drop every item at position `len` and beyond.
    Truncate {
        /// Length to keep, `0..=len`.
        len: usize,
    },
}

impl<T> DiffOp<T> {
    /// Short operation name used in logs and desync reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Pop => "pop",
            Self::InsertAt { .. } => "insert_at",
            Self::RemoveAt { .. } => "remove_at",
            Self::UpdateAt { .. } => "update_at",
            Self::Move { .. } => "move",
            Self::Replace { .. } => "replace",
            Self::Clear => "clear",
            Self::Append { .. } => "append",
            Self::PushFront { .. } => "push_front",
            Self::PopFront => "pop_front",
            Self::Truncate { .. } => "truncate",
        }
    }

    /// Whether this operation rebuilds the collection from scratch.
    ///
    /// These are the operations a caller issues (through the engine) to
    /// recover from a desync.
    pub fn is_resync(&self) -> bool {
        matches!(self, Self::Replace { .. } | Self::Clear)
    }

    /// Convert the carried items, keeping positions untouched.
    ///
    /// Engine adapters use this to map foreign items into projection items.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> DiffOp<U> {
        match self {
            Self::Push { item } => DiffOp::Push { item: f(item) },
            Self::Pop => DiffOp::Pop,
            Self::InsertAt { index, item } => DiffOp::InsertAt { index, item: f(item) },
            Self::RemoveAt { index } => DiffOp::RemoveAt { index },
            Self::UpdateAt { index, item } => DiffOp::UpdateAt { index, item: f(item) },
            Self::Move { from, to } => DiffOp::Move { from, to },
            Self::Replace { items } => {
                DiffOp::Replace { items: items.into_iter().map(f).collect() }
            },
            Self::Clear => DiffOp::Clear,
            Self::Append { items } => {
                DiffOp::Append { items: items.into_iter().map(f).collect() }
            },
            Self::PushFront { item } => DiffOp::PushFront { item: f(item) },
            Self::PopFront => DiffOp::PopFront,
            Self::Truncate { len } => DiffOp::Truncate { len },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resync_ops() {
        assert!(DiffOp::<u8>::Clear.is_resync());
        assert!(DiffOp::Replace { items: vec![1u8] }.is_resync());
        assert!(!DiffOp::Push { item: 1u8 }.is_resync());
        assert!(!DiffOp::<u8>::Truncate { len: 0 }.is_resync());
    }

    #[test]
    fn map_keeps_positions() {
        let op = DiffOp::InsertAt { index: 3, item: 7u32 }.map(|v| v.to_string());
        assert_eq!(op, DiffOp::InsertAt { index: 3, item: "7".to_string() });

        let op = DiffOp::<u32>::Move { from: 1, to: 4 }.map(|v| v * 2);
        assert_eq!(op, DiffOp::Move { from: 1, to: 4 });
    }
}
