//! Property-based tests for the diff projector.
//!
//! Properties hold for arbitrary prior state and arbitrary operation
//! sequences, including operations that reference invalid positions.

use prism_core::{DesyncError, DiffOp, DiffProjector};
use proptest::prelude::*;

/// Generate operations with indices that are sometimes out of range.
fn op_strategy() -> impl Strategy<Value = DiffOp<u16>> {
    prop_oneof![
        3 => any::<u16>().prop_map(|item| DiffOp::Push { item }),
        1 => Just(DiffOp::<u16>::Pop),
        2 => (0usize..12, any::<u16>()).prop_map(|(index, item)| DiffOp::InsertAt { index, item }),
        2 => (0usize..12).prop_map(|index| DiffOp::RemoveAt { index }),
        2 => (0usize..12, any::<u16>()).prop_map(|(index, item)| DiffOp::UpdateAt { index, item }),
        2 => (0usize..12, 0usize..12).prop_map(|(from, to)| DiffOp::Move { from, to }),
        1 => prop::collection::vec(any::<u16>(), 0..6).prop_map(|items| DiffOp::Replace { items }),
        1 => Just(DiffOp::<u16>::Clear),
        1 => prop::collection::vec(any::<u16>(), 0..4).prop_map(|items| DiffOp::Append { items }),
        1 => any::<u16>().prop_map(|item| DiffOp::PushFront { item }),
        1 => Just(DiffOp::<u16>::PopFront),
        1 => (0usize..12).prop_map(|len| DiffOp::Truncate { len }),
    ]
}

/// Projector holding `items`.
fn seeded(items: Vec<u16>) -> DiffProjector<u16> {
    let mut projector = DiffProjector::new();
    let _ = projector.apply(DiffOp::Replace { items });
    projector
}

proptest! {
    #[test]
    fn prop_push_then_pop_is_identity(
        initial in prop::collection::vec(any::<u16>(), 0..20),
        item in any::<u16>()
    ) {
        let mut projector = seeded(initial.clone());

        prop_assert!(projector.apply(DiffOp::Push { item }).is_ok(), "apply rejected");
        prop_assert!(projector.apply(DiffOp::Pop).is_ok());

        prop_assert_eq!(projector.items(), initial.as_slice());
    }

    #[test]
    fn prop_replace_installs_exactly_items(
        initial in prop::collection::vec(any::<u16>(), 0..20),
        history in prop::collection::vec(op_strategy(), 0..20),
        items in prop::collection::vec(any::<u16>(), 0..20)
    ) {
        let mut projector = seeded(initial);
        for op in history {
            let _ = projector.apply(op);
        }

        prop_assert!(projector.apply(DiffOp::Replace { items: items.clone() }).is_ok(), "apply rejected");
        prop_assert_eq!(projector.items(), items.as_slice());
        let snapshot = projector.snapshot();
        prop_assert_eq!(snapshot.items(), items.as_slice());
    }

    #[test]
    fn prop_move_preserves_others(
        initial in prop::collection::vec(any::<u16>(), 1..20),
        from_seed in any::<usize>(),
        to_seed in any::<usize>()
    ) {
        let len = initial.len();
        let (from, to) = (from_seed % len, to_seed % len);
        // Tag each value with its original position so duplicates stay distinct.
        let tagged: Vec<(usize, u16)> = initial.iter().copied().enumerate().collect();
        let mut projector = DiffProjector::new();
        prop_assert!(projector.apply(DiffOp::Replace { items: tagged.clone() }).is_ok(), "apply rejected");

        prop_assert!(projector.apply(DiffOp::Move { from, to }).is_ok(), "apply rejected");

        let moved = tagged[from];
        prop_assert_eq!(projector.items()[to], moved);

        let mut sorted_before = tagged.clone();
        let mut sorted_after = projector.items().to_vec();
        sorted_before.sort_unstable();
        sorted_after.sort_unstable();
        prop_assert_eq!(sorted_before, sorted_after);

        let others_before: Vec<_> = tagged.iter().filter(|t| **t != moved).collect();
        let others_after: Vec<_> = projector.items().iter().filter(|t| **t != moved).collect();
        prop_assert_eq!(others_before, others_after);
    }

    #[test]
    fn prop_desync_leaves_sequence_untouched(
        initial in prop::collection::vec(any::<u16>(), 0..10),
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        let mut projector = seeded(initial);
        let mut sub = projector.subscribe();
        let _ = sub.drain();

        for op in ops {
            let before = projector.items().to_vec();
            let version = projector.version();

            match projector.apply(op) {
                Ok(()) => {
                    prop_assert_eq!(projector.version(), version + 1);
                    let published = sub.drain();
                    prop_assert_eq!(published.len(), 1);
                    prop_assert_eq!(published[0].items(), projector.items());
                },
                Err(err) => {
                    prop_assert!(matches!(
                        err,
                        DesyncError::IndexOutOfBounds { .. }
                            | DesyncError::MoveOutOfBounds { .. }
                            | DesyncError::EmptySequence { .. }
                            | DesyncError::TruncateBeyondLength { .. }
                    ), "unexpected error: {err:?}");
                    prop_assert_eq!(projector.items(), before.as_slice());
                    prop_assert_eq!(projector.version(), version);
                    prop_assert!(sub.drain().is_empty());
                },
            }
        }
    }
}

#[test]
fn update_beyond_length_raises_desync() {
    let mut projector = seeded(vec![1, 2, 3]);
    let result = projector.apply(DiffOp::UpdateAt { index: 5, item: 9 });

    assert_eq!(result, Err(DesyncError::IndexOutOfBounds { op: "update_at", index: 5, len: 3 }));
    assert_eq!(projector.items(), [1, 2, 3]);
}
