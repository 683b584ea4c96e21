//! Fuzz target for diff application
//!
//! Every operation is applied to the projector and to the reference
//! sequence; the two must agree on each step.
//!
//! # Invariants
//!
//! - Accepted operations produce exactly the reference items
//! - Rejected operations leave items and version untouched
//! - Exactly one snapshot is published per accepted operation

#![no_main]

use libfuzzer_sys::fuzz_target;
use prism_core::DiffProjector;
use prism_harness::{DiffOperation, ModelOutcome, ModelSequence};

fuzz_target!(|ops: Vec<DiffOperation>| {
    let mut model = ModelSequence::new();
    let mut projector = DiffProjector::new();
    let mut sub = projector.subscribe();
    let _ = sub.drain();

    for op in &ops {
        let version = projector.version();
        let expected = model.apply(op);

        match (expected, projector.apply(op.to_diff())) {
            (ModelOutcome::Applied, Ok(())) => {
                assert_eq!(projector.version(), version + 1);
                assert_eq!(sub.drain().len(), 1);
            },
            (ModelOutcome::Desync, Err(_)) => {
                assert_eq!(projector.version(), version);
                assert!(sub.drain().is_empty());
            },
            (expected, actual) => panic!("{op:?}: model {expected:?}, projector {actual:?}"),
        }

        assert_eq!(projector.items(), model.items());
    }
});
