//! Generic ordered-diff projector.
//!
//! [`DiffProjector`] owns the authoritative sequence of one collection and
//! applies [`DiffOp`]s to it. After every successfully applied operation it
//! publishes exactly one [`Snapshot`]. A failed operation publishes nothing
//! and leaves the sequence untouched.
//!
//! The projector never looks at item payloads; it is shared by the timeline
//! and the room list.

use crate::{ApplyDiff, DesyncError, DiffOp, Observable, Snapshot, Subscriber};

/// Orientation of published snapshots relative to the authoritative sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotOrder {
    /// Same order as the authoritative sequence.
    #[default]
    Authoritative,
    /// Reversed, e.g. for newest-first display of an oldest-first feed.
    Reversed,
}

/// Applies diff operations to an authoritative sequence and publishes
/// snapshots of it.
#[derive(Debug)]
pub struct DiffProjector<T> {
    /// Authoritative sequence, in feed order.
    items: Vec<T>,
    /// Count of applied operations.
    version: u64,
    /// Orientation of published snapshots.
    order: SnapshotOrder,
    /// Published snapshots.
    published: Observable<Snapshot<T>>,
}

impl<T: Clone> Default for DiffProjector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DiffProjector<T> {
    /// Create an empty projector publishing in authoritative order.
    pub fn new() -> Self {
        Self::with_order(SnapshotOrder::Authoritative)
    }

    /// Create an empty projector publishing in the given order.
    pub fn with_order(order: SnapshotOrder) -> Self {
        Self { items: Vec::new(), version: 0, order, published: Observable::new(Snapshot::empty()) }
    }

    /// Apply one operation and publish the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DesyncError`] if the operation references a position that
    /// does not exist. Nothing is modified or published in that case.
    pub fn apply(&mut self, op: DiffOp<T>) -> Result<(), DesyncError> {
        self.mutate(op)?;
        self.version += 1;
        let snapshot = Snapshot::new(self.version, self.ordered());
        self.published.publish(snapshot);
        Ok(())
    }

    fn mutate(&mut self, op: DiffOp<T>) -> Result<(), DesyncError> {
        let len = self.items.len();
        let name = op.name();
        match op {
            DiffOp::Push { item } => self.items.push(item),
            DiffOp::Pop | DiffOp::PopFront if len == 0 => {
                return Err(DesyncError::EmptySequence { op: name });
            },
            DiffOp::Pop => {
                self.items.pop();
            },
            DiffOp::PopFront => {
                self.items.remove(0);
            },
            DiffOp::InsertAt { index, item } => {
                if index > len {
                    return Err(DesyncError::IndexOutOfBounds { op: name, index, len });
                }
                self.items.insert(index, item);
            },
            DiffOp::RemoveAt { index } => {
                if index >= len {
                    return Err(DesyncError::IndexOutOfBounds { op: name, index, len });
                }
                self.items.remove(index);
            },
            DiffOp::UpdateAt { index, item } => match self.items.get_mut(index) {
                Some(slot) => *slot = item,
                None => return Err(DesyncError::IndexOutOfBounds { op: name, index, len }),
            },
            DiffOp::Move { from, to } => {
                if from >= len || to >= len {
                    return Err(DesyncError::MoveOutOfBounds { from, to, len });
                }
                let item = self.items.remove(from);
                self.items.insert(to, item);
            },
            DiffOp::Replace { items } => self.items = items,
            DiffOp::Clear => self.items.clear(),
            DiffOp::Append { items } => self.items.extend(items),
            DiffOp::PushFront { item } => self.items.insert(0, item),
            DiffOp::Truncate { len: keep } => {
                if keep > len {
                    return Err(DesyncError::TruncateBeyondLength { requested: keep, len });
                }
                self.items.truncate(keep);
            },
        }
        Ok(())
    }

    fn ordered(&self) -> Vec<T> {
        match self.order {
            SnapshotOrder::Authoritative => self.items.clone(),
            SnapshotOrder::Reversed => self.items.iter().rev().cloned().collect(),
        }
    }

    /// Authoritative sequence, in feed order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items in the authoritative sequence.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the authoritative sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of operations applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.published.get().clone()
    }

    /// Subscribe to published snapshots, starting with the current one.
    pub fn subscribe(&mut self) -> Subscriber<Snapshot<T>> {
        self.published.subscribe()
    }
}

impl<T: Clone> ApplyDiff for DiffProjector<T> {
    type Item = T;

    fn apply(&mut self, op: DiffOp<T>) -> Result<(), DesyncError> {
        DiffProjector::apply(self, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector_with(items: &[&'static str]) -> DiffProjector<&'static str> {
        let mut projector = DiffProjector::new();
        let _ = projector.apply(DiffOp::Replace { items: items.to_vec() });
        projector
    }

    #[test]
    fn push_push_insert() {
        let mut projector = DiffProjector::new();
        projector.apply(DiffOp::Push { item: "A" }).unwrap();
        projector.apply(DiffOp::Push { item: "B" }).unwrap();
        projector.apply(DiffOp::InsertAt { index: 1, item: "C" }).unwrap();

        assert_eq!(projector.items(), ["A", "C", "B"]);
        assert_eq!(projector.version(), 3);
    }

    #[test]
    fn update_out_of_bounds_is_desync() {
        let mut projector = projector_with(&["A", "B", "C"]);
        let before = projector.snapshot();

        let result = projector.apply(DiffOp::UpdateAt { index: 5, item: "X" });

        assert_eq!(
            result,
            Err(DesyncError::IndexOutOfBounds { op: "update_at", index: 5, len: 3 })
        );
        assert_eq!(projector.items(), ["A", "B", "C"]);
        assert_eq!(projector.snapshot(), before);
    }

    #[test]
    fn pop_on_empty_is_desync() {
        let mut projector = DiffProjector::<u8>::new();
        assert_eq!(projector.apply(DiffOp::Pop), Err(DesyncError::EmptySequence { op: "pop" }));
        assert_eq!(
            projector.apply(DiffOp::PopFront),
            Err(DesyncError::EmptySequence { op: "pop_front" })
        );
        assert_eq!(projector.version(), 0);
    }

    #[test]
    fn insert_at_len_appends() {
        let mut projector = projector_with(&["A"]);
        projector.apply(DiffOp::InsertAt { index: 1, item: "B" }).unwrap();
        assert_eq!(projector.items(), ["A", "B"]);

        let result = projector.apply(DiffOp::InsertAt { index: 3, item: "C" });
        assert!(matches!(result, Err(DesyncError::IndexOutOfBounds { index: 3, len: 2, .. })));
    }

    #[test]
    fn move_forward_and_backward() {
        let mut projector = projector_with(&["A", "B", "C", "D"]);
        projector.apply(DiffOp::Move { from: 0, to: 2 }).unwrap();
        assert_eq!(projector.items(), ["B", "C", "A", "D"]);

        projector.apply(DiffOp::Move { from: 3, to: 0 }).unwrap();
        assert_eq!(projector.items(), ["D", "B", "C", "A"]);

        let result = projector.apply(DiffOp::Move { from: 1, to: 4 });
        assert_eq!(result, Err(DesyncError::MoveOutOfBounds { from: 1, to: 4, len: 4 }));
    }

    #[test]
    fn front_operations_and_truncate() {
        let mut projector = projector_with(&["B", "C"]);
        projector.apply(DiffOp::PushFront { item: "A" }).unwrap();
        projector.apply(DiffOp::Append { items: vec!["D", "E"] }).unwrap();
        assert_eq!(projector.items(), ["A", "B", "C", "D", "E"]);

        projector.apply(DiffOp::PopFront).unwrap();
        projector.apply(DiffOp::Truncate { len: 2 }).unwrap();
        assert_eq!(projector.items(), ["B", "C"]);

        let result = projector.apply(DiffOp::Truncate { len: 3 });
        assert_eq!(result, Err(DesyncError::TruncateBeyondLength { requested: 3, len: 2 }));
    }

    #[test]
    fn clear_is_not_a_desync_on_empty() {
        let mut projector = DiffProjector::<u8>::new();
        assert!(projector.apply(DiffOp::Clear).is_ok());
        assert_eq!(projector.version(), 1);
    }

    #[test]
    fn reversed_snapshots() {
        let mut projector = DiffProjector::with_order(SnapshotOrder::Reversed);
        projector.apply(DiffOp::Append { items: vec![1, 2, 3] }).unwrap();

        assert_eq!(projector.items(), [1, 2, 3]);
        assert_eq!(projector.snapshot().items(), [3, 2, 1]);
    }

    #[test]
    fn every_applied_op_is_published() {
        let mut projector = DiffProjector::new();
        let mut sub = projector.subscribe();

        projector.apply(DiffOp::Push { item: 1 }).unwrap();
        let _ = projector.apply(DiffOp::RemoveAt { index: 9 });
        projector.apply(DiffOp::Pop).unwrap();

        let seen: Vec<(u64, Vec<i32>)> =
            sub.drain().into_iter().map(|s| (s.version(), s.items().to_vec())).collect();
        assert_eq!(seen, vec![(0, vec![]), (1, vec![1]), (2, vec![])]);
    }
}
