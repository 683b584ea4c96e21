//! Model-based property tests.
//!
//! Random operation sequences are applied to a reference model and to the
//! real component; after every step their observable states must agree and
//! the standard invariants must hold.
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!       Model          Real           Compare
//!     (reference)   (projector /      results
//!                    registry)
//! ```

use std::sync::Arc;

use prism_core::{DesyncError, DiffProjector, Snapshot};
use prism_harness::{
    DiffOperation, FakeEngine, InvariantRegistry, ModelOutcome, ModelRegistry, ModelSequence,
    ModelSessionId, RegistryOperation, SystemSnapshot, session_id,
};
use prism_session::{Session, SessionConfig, SessionRegistry};
use proptest::prelude::*;

const SESSION_SLOTS: ModelSessionId = 4;

fn items_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..6)
}

fn diff_strategy() -> impl Strategy<Value = DiffOperation> {
    let index = 0u8..8;
    prop_oneof![
        4 => any::<u8>().prop_map(DiffOperation::Push),
        2 => Just(DiffOperation::Pop),
        3 => (index.clone(), any::<u8>()).prop_map(|(i, v)| DiffOperation::InsertAt(i, v)),
        2 => index.clone().prop_map(DiffOperation::RemoveAt),
        2 => (index.clone(), any::<u8>()).prop_map(|(i, v)| DiffOperation::UpdateAt(i, v)),
        2 => (index.clone(), index.clone()).prop_map(|(from, to)| DiffOperation::Move(from, to)),
        1 => items_strategy().prop_map(DiffOperation::Replace),
        1 => Just(DiffOperation::Clear),
        1 => items_strategy().prop_map(DiffOperation::Append),
        2 => any::<u8>().prop_map(DiffOperation::PushFront),
        1 => Just(DiffOperation::PopFront),
        1 => index.prop_map(DiffOperation::Truncate),
    ]
}

fn registry_strategy() -> impl Strategy<Value = RegistryOperation> {
    let id = 0..SESSION_SLOTS;
    prop_oneof![
        3 => id.clone().prop_map(RegistryOperation::Create),
        3 => id.clone().prop_map(RegistryOperation::SetActive),
        2 => id.prop_map(RegistryOperation::Release),
        1 => Just(RegistryOperation::ReleaseActive),
    ]
}

async fn apply_real(registry: &SessionRegistry, engine: &FakeEngine, op: RegistryOperation) {
    match op {
        RegistryOperation::Create(id) => {
            let user_id = format!("@user{id}:example.org");
            let session = Session::new(session_id(id), user_id, Arc::new(engine.clone()));
            registry.create(session).await;
        },
        RegistryOperation::SetActive(id) => registry.set_active(&session_id(id)).await,
        RegistryOperation::Release(id) => {
            registry.release(&session_id(id)).await;
        },
        RegistryOperation::ReleaseActive => {
            registry.release_active_session().await;
        },
    }
}

proptest! {
    /// The projector agrees with the reference sequence on every step:
    /// same items, same accept/desync decision, one snapshot per applied op.
    #[test]
    fn prop_projector_matches_model(ops in prop::collection::vec(diff_strategy(), 0..60)) {
        let mut model = ModelSequence::new();
        let mut projector = DiffProjector::new();
        let mut sub = projector.subscribe();
        let mut versions = vec![0];

        for op in &ops {
            let expected = model.apply(op);
            let before = projector.snapshot();
            let result = projector.apply(op.to_diff());

            match expected {
                ModelOutcome::Applied => {
                    prop_assert!(result.is_ok(), "{op:?} rejected: {result:?}");
                },
                ModelOutcome::Desync => {
                    prop_assert!(matches!(
                        result,
                        Err(DesyncError::IndexOutOfBounds { .. }
                            | DesyncError::MoveOutOfBounds { .. }
                            | DesyncError::EmptySequence { .. }
                            | DesyncError::TruncateBeyondLength { .. })
                    ), "{op:?} expected desync: {result:?}");
                    prop_assert_eq!(projector.snapshot(), before);
                },
            }
            prop_assert_eq!(projector.items(), model.items());

            let published: Vec<Snapshot<u8>> = sub.drain();
            let expected_count = usize::from(expected == ModelOutcome::Applied);
            prop_assert_eq!(published.len(), expected_count);
            versions.extend(published.iter().map(Snapshot::version));
        }

        let state = SystemSnapshot::empty().with_versions("projector", versions);
        prop_assert!(InvariantRegistry::standard().check_all(&state).is_ok());
    }

    /// The registry agrees with the reference model and its active pointer
    /// always references a registered graph.
    #[test]
    fn prop_registry_matches_model(ops in prop::collection::vec(registry_strategy(), 0..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let invariants = InvariantRegistry::standard();

        runtime.block_on(async {
            let engine = FakeEngine::new();
            let registry = SessionRegistry::new(SessionConfig::default());
            let mut model = ModelRegistry::new();

            for op in ops {
                model.apply(op);
                apply_real(&registry, &engine, op).await;

                let state = SystemSnapshot::from_registry(&registry).await;
                let expected: Vec<_> = model.sessions().into_iter().map(session_id).collect();
                prop_assert_eq!(&state.sessions, &expected);
                prop_assert_eq!(&state.active, &model.active().map(session_id));
                prop_assert!(invariants.check_all(&state).is_ok(), "{op:?}");
            }
            Ok(())
        })?;
    }
}

#[test]
fn release_non_active_keeps_pointer() {
    let mut model = ModelRegistry::new();
    model.apply(RegistryOperation::Create(1));
    model.apply(RegistryOperation::Create(2));
    model.apply(RegistryOperation::Release(1));
    assert_eq!(model.active(), Some(2));

    model.apply(RegistryOperation::ReleaseActive);
    assert_eq!(model.active(), None);
    assert!(model.sessions().is_empty());
}
