//! Reference sequence for diff application.

use std::slice;

use super::DiffOperation;

/// Whether the model accepted an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Applied; the real projector must publish one snapshot.
    Applied,
    /// Out of range; the real projector must report a desync and publish
    /// nothing.
    Desync,
}

/// Vector-backed reference implementation of diff semantics.
///
/// Written without sharing any code with the real projector, by rebuilding
/// the sequence from slices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSequence {
    items: Vec<u8>,
}

impl ModelSequence {
    /// Empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current items.
    pub fn items(&self) -> &[u8] {
        &self.items
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &DiffOperation) -> ModelOutcome {
        let current = self.items.as_slice();
        let len = current.len();
        let next: Option<Vec<u8>> = match op {
            DiffOperation::Push(item) => Some([current, slice::from_ref(item)].concat()),
            DiffOperation::Pop => (len > 0).then(|| current[..len - 1].to_vec()),
            DiffOperation::InsertAt(index, item) => {
                let index = usize::from(*index);
                (index <= len)
                    .then(|| [&current[..index], slice::from_ref(item), &current[index..]].concat())
            },
            DiffOperation::RemoveAt(index) => {
                let index = usize::from(*index);
                (index < len).then(|| [&current[..index], &current[index + 1..]].concat())
            },
            DiffOperation::UpdateAt(index, item) => {
                let index = usize::from(*index);
                (index < len).then(|| {
                    [&current[..index], slice::from_ref(item), &current[index + 1..]].concat()
                })
            },
            DiffOperation::Move(from, to) => {
                let (from, to) = (usize::from(*from), usize::from(*to));
                (from < len && to < len).then(|| {
                    let moved = current[from];
                    let rest: Vec<u8> = [&current[..from], &current[from + 1..]].concat();
                    [&rest[..to], slice::from_ref(&moved), &rest[to..]].concat()
                })
            },
            DiffOperation::Replace(items) => Some(items.clone()),
            DiffOperation::Clear => Some(Vec::new()),
            DiffOperation::Append(items) => Some([current, items.as_slice()].concat()),
            DiffOperation::PushFront(item) => Some([slice::from_ref(item), current].concat()),
            DiffOperation::PopFront => (len > 0).then(|| current[1..].to_vec()),
            DiffOperation::Truncate(keep) => {
                let keep = usize::from(*keep);
                (keep <= len).then(|| current[..keep].to_vec())
            },
        };

        match next {
            Some(items) => {
                self.items = items;
                ModelOutcome::Applied
            },
            None => ModelOutcome::Desync,
        }
    }
}
